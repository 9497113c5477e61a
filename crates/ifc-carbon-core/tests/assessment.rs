// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parse, extract and assess a small building end to end

use approx::assert_relative_eq;
use ifc_carbon_core::{
    assess, CarbonConfig, DatabaseError, ElementBucket, MaterialDatabase, NameMatching,
};
use ifc_carbon_model::{BuildingModel, ElementCategory, IfcParser};
use ifc_carbon_parser::{extract_building, StepParser};

const HOUSE: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('house.ifc','2024-03-01T10:00:00',('Architect'),('Practice'),'IfcOpenShell','Exporter','');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('p-guid',$,'Housing',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3,#4));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCSIUNIT(*,.AREAUNIT.,$,.SQUARE_METRE.);
#10=IFCBUILDING('b-guid',$,'Terrace',$,$,$,$,$,.ELEMENT.,$,$,$);
#11=IFCPROPERTYSINGLEVALUE('YearOfConstruction',$,IFCLABEL('2024'),$);
#12=IFCPROPERTYSET('ps-b',$,'Pset_BuildingCommon',$,(#11));
#13=IFCRELDEFINESBYPROPERTIES('r-b',$,$,$,(#10),#12);
#20=IFCMATERIAL('Brick');
#21=IFCMATERIAL('Concrete');
#22=IFCMATERIALLAYER(#20,100.0,$);
#23=IFCMATERIALLAYER(#21,200.0,$);
#24=IFCMATERIALLAYERSET((#22),'Brick 100');
#25=IFCMATERIALLAYERSET((#23),'Concrete 200');
#26=IFCMATERIALLAYERSETUSAGE(#24,.AXIS2.,.POSITIVE.,0.0);
#27=IFCMATERIALLAYERSETUSAGE(#25,.AXIS3.,.POSITIVE.,0.0);
#30=IFCPROPERTYSINGLEVALUE('Embodied Carbon',$,IFCLABEL('0.2 (kgCO\X2\2082\X0\/kg)'),$);
#31=IFCPROPERTYSINGLEVALUE('MassDensity',$,IFCREAL(1800.0),$);
#32=IFCCOMPLEXPROPERTY('Brick',$,'Material',(#30,#31));
#33=IFCCOMPLEXPROPERTY('Layer 1',$,'Component',(#32));
#34=IFCPROPERTYSINGLEVALUE('Embodied Carbon',$,IFCLABEL('0,1 (kgCO\X2\2082\X0\/kg)'),$);
#35=IFCPROPERTYSINGLEVALUE('MassDensity',$,IFCREAL(2400.0),$);
#36=IFCCOMPLEXPROPERTY('Concrete',$,'Material',(#34,#35));
#37=IFCCOMPLEXPROPERTY('Layer 2',$,'Component',(#36));
#38=IFCPROPERTYSET('ps-m',$,'Material Properties',$,(#33,#37));
#39=IFCRELDEFINESBYPROPERTIES('r-m',$,$,$,(#100,#200,#300),#38);
#100=IFCWALLSTANDARDCASE('w-guid',$,'Party Wall',$,$,$,$,$);
#101=IFCQUANTITYAREA('NetSideArea',$,$,10.0);
#102=IFCELEMENTQUANTITY('q-w',$,'BaseQuantities',$,$,(#101));
#103=IFCRELDEFINESBYPROPERTIES('r-w',$,$,$,(#100),#102);
#104=IFCRELASSOCIATESMATERIAL('a-w',$,$,$,(#100),#26);
#200=IFCSLAB('s-guid',$,'Ground Floor',$,$,$,$,$,.FLOOR.);
#201=IFCQUANTITYAREA('NetArea',$,$,50.0);
#202=IFCELEMENTQUANTITY('q-s',$,'BaseQuantities',$,$,(#201));
#203=IFCRELDEFINESBYPROPERTIES('r-s',$,$,$,(#200),#202);
#300=IFCSLAB('f-guid',$,'Footing',$,$,$,$,$,.BASESLAB.);
#301=IFCQUANTITYAREA('NetArea',$,$,20.0);
#302=IFCELEMENTQUANTITY('q-f',$,'BaseQuantities',$,$,(#301));
#303=IFCRELDEFINESBYPROPERTIES('r-f',$,$,$,(#300),#302);
#304=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#305=IFCPROPERTYSET('ps-f',$,'Pset_SlabCommon',$,(#304));
#306=IFCRELDEFINESBYPROPERTIES('r-f2',$,$,$,(#300),#305);
#307=IFCRELASSOCIATESMATERIAL('a-s',$,$,$,(#200,#300),#27);
#400=IFCDOOR('d-guid',$,'Front Door',$,$,$,$,$,$,$);
#401=IFCQUANTITYVOLUME('Volume',$,$,0.1);
#402=IFCELEMENTQUANTITY('q-d',$,'BaseQuantities',$,$,(#401));
#403=IFCRELDEFINESBYPROPERTIES('r-d',$,$,$,(#400),#402);
#404=IFCPROPERTYSINGLEVALUE('EmbodiedCarbon',$,IFCREAL(1.5),$);
#405=IFCPROPERTYSINGLEVALUE('MassDensity',$,IFCREAL(600.0),$);
#406=IFCPROPERTYSET('ps-d',$,'EC_Pset_EmbodiedCarbon',$,(#404,#405));
#407=IFCRELDEFINESBYPROPERTIES('r-d2',$,$,$,(#400),#406);
#408=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#409=IFCPROPERTYSET('ps-d3',$,'Pset_DoorCommon',$,(#408));
#410=IFCRELDEFINESBYPROPERTIES('r-d3',$,$,$,(#400),#409);
ENDSEC;
END-ISO-10303-21;
"#;

const DATABASE: &str = "ID;Name;EmbodiedCarbon(kgCO2e/kg);Density
EC-BR-01;Brick;0,2;1800
EC-BR-02;Reclaimed Brick;0,05;1800
EC-CO-01;Concrete;0,1;2400
EC-CO-02;GGBS Concrete;0,075;2400
EC-CO-03;Geopolymer Concrete;0,09;2000
";

fn building() -> BuildingModel {
    let model = StepParser::new().parse(HOUSE).unwrap();
    extract_building(model.as_ref()).unwrap()
}

fn database(content: &str) -> Result<MaterialDatabase, DatabaseError> {
    let config = CarbonConfig::default();
    MaterialDatabase::parse(content, &config.database, NameMatching::CaseInsensitive)
}

#[test]
fn extracts_every_element() {
    let building = building();
    assert_eq!(building.identity, "Terrace (b-guid)");
    assert_eq!(building.count(ElementCategory::Wall), 1);
    assert_eq!(building.count(ElementCategory::Slab), 2);
    assert_eq!(building.count(ElementCategory::Door), 1);
    assert_eq!(building.count(ElementCategory::Roof), 0);
}

#[test]
fn aggregates_and_projects() {
    let assessment = assess(
        &building(),
        &database(DATABASE).unwrap(),
        &CarbonConfig::default(),
    )
    .unwrap();

    let actual = &assessment.actual;
    assert_relative_eq!(actual.material_counts.get("Brick").unwrap(), 360.0, max_relative = 1e-9);
    assert_relative_eq!(actual.material_counts.get("Concrete").unwrap(), 3360.0, max_relative = 1e-9);
    assert_relative_eq!(actual.material_counts.get("Door Composite").unwrap(), 90.0, max_relative = 1e-9);

    let bucket = |category, external| actual.element_counts.get(&ElementBucket::new(category, external));
    assert_relative_eq!(bucket(ElementCategory::Wall, false).unwrap(), 360.0, max_relative = 1e-9);
    assert_relative_eq!(bucket(ElementCategory::Slab, false).unwrap(), 2400.0, max_relative = 1e-9);
    assert_relative_eq!(bucket(ElementCategory::Slab, true).unwrap(), 960.0, max_relative = 1e-9);
    assert_relative_eq!(bucket(ElementCategory::Door, true).unwrap(), 90.0, max_relative = 1e-9);

    let summary = &assessment.summary;
    assert_relative_eq!(summary.building_area_internal, 50.0);
    assert_relative_eq!(summary.building_ec, 3810.0, max_relative = 1e-9);
    assert_relative_eq!(summary.building_ec_per_area_internal, 76.2, max_relative = 1e-9);
    assert_relative_eq!(summary.potential_building_ec, 2700.0, max_relative = 1e-9);
    assert_relative_eq!(summary.potential_saving, 1110.0, max_relative = 1e-9);

    let concrete = &assessment.replacements[0];
    assert_eq!(concrete.material, "Concrete");
    let names: Vec<_> = concrete.alternatives.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["GGBS Concrete", "Geopolymer Concrete"]);
}

#[test]
fn duplicate_database_names_abort_before_aggregation() {
    let duplicated = format!("{}EC-BR-09;Brick;0,3;1900\n", DATABASE);
    assert!(matches!(
        database(&duplicated),
        Err(DatabaseError::DuplicateName { .. })
    ));
}

#[test]
fn unmatched_material_keeps_actual_carbon() {
    let without_brick = "ID;Name;EmbodiedCarbon(kgCO2e/kg);Density
EC-CO-01;Concrete;0,1;2400
";
    let assessment = assess(
        &building(),
        &database(without_brick).unwrap(),
        &CarbonConfig::default(),
    )
    .unwrap();

    assert_eq!(assessment.unmatched, vec!["Brick", "Door Composite"]);
    assert_eq!(
        assessment.potential.material_counts.get("Brick"),
        assessment.actual.material_counts.get("Brick")
    );
    assert!(assessment.replacements.is_empty());
}
