// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP file tokenizer using nom combinators
//!
//! Parses STEP/IFC entity definitions into tokens.

use ifc_carbon_model::{AttributeValue, DecodedEntity, EntityId, IfcType};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0, one_of},
    combinator::{map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated},
    IResult, Parser,
};
use std::borrow::Cow;

/// Raw token from STEP file (before conversion to AttributeValue)
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    /// Entity reference (#123)
    EntityRef(u32),
    /// String value ('text'), still escaped
    String(&'a str),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Enumeration (.VALUE.)
    Enum(&'a str),
    /// List of tokens
    List(Vec<Token<'a>>),
    /// Typed value like IFCLABEL('text')
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Null value ($)
    Null,
    /// Derived value (*)
    Derived,
}

impl<'a> Token<'a> {
    /// Convert token to owned AttributeValue, decoding string escapes
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            Token::EntityRef(id) => AttributeValue::EntityRef(EntityId(*id)),
            Token::String(s) => AttributeValue::String(decode_step_string(s).into_owned()),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(s) => AttributeValue::Enum((*s).to_string()),
            Token::List(items) => {
                AttributeValue::List(items.iter().map(|t| t.to_attribute_value()).collect())
            }
            Token::TypedValue(name, args) => AttributeValue::TypedValue(
                (*name).to_string(),
                args.iter().map(|t| t.to_attribute_value()).collect(),
            ),
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }
}

/// Decode the escape sequences of a STEP string literal
///
/// Handles `''`, `\\`, `\X2\hhhh…\X0\` (UTF-16), `\X4\hhhhhhhh…\X0\` (UTF-32),
/// `\X\hh` (ISO 8859-1) and `\S\c` (upper half of ISO 8859). Code page
/// switches (`\PA\`) are dropped. Malformed sequences are kept verbatim.
pub fn decode_step_string(raw: &str) -> Cow<'_, str> {
    let is_special = |c: char| c == '\\' || c == '\'';
    if !raw.contains(is_special) {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(is_special) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if let Some(r) = rest.strip_prefix("''") {
            out.push('\'');
            rest = r;
            continue;
        }
        if let Some(r) = rest.strip_prefix("\\\\") {
            out.push('\\');
            rest = r;
            continue;
        }
        if let Some(r) = rest.strip_prefix("\\X2\\") {
            if let Some((decoded, r)) = decode_hex_run(r, 4) {
                out.extend(
                    char::decode_utf16(decoded.into_iter().map(|u| u as u16))
                        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)),
                );
                rest = r;
                continue;
            }
        }
        if let Some(r) = rest.strip_prefix("\\X4\\") {
            if let Some((decoded, r)) = decode_hex_run(r, 8) {
                out.extend(
                    decoded
                        .into_iter()
                        .map(|u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER)),
                );
                rest = r;
                continue;
            }
        }
        if let Some(r) = rest.strip_prefix("\\X\\") {
            if let Some(byte) = r.get(..2).and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(char::from(byte));
                rest = &r[2..];
                continue;
            }
        }
        if let Some(r) = rest.strip_prefix("\\S\\") {
            if let Some(c) = r.chars().next().filter(|c| c.is_ascii()) {
                out.push(char::from(c as u8 + 0x80));
                rest = &r[1..];
                continue;
            }
        }
        if rest.len() >= 4 && rest.starts_with("\\P") && rest.as_bytes()[3] == b'\\' {
            rest = &rest[4..];
            continue;
        }

        // Not an escape we know; keep the character
        let c = rest.chars().next().unwrap_or('\\');
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode hex groups of `width` digits up to the closing `\X0\`
fn decode_hex_run(input: &str, width: usize) -> Option<(Vec<u32>, &str)> {
    let end = input.find("\\X0\\")?;
    let hex = &input[..end];
    if !hex.is_ascii() || hex.len() % width != 0 {
        return None;
    }
    let values = (0..hex.len())
        .step_by(width)
        .map(|i| u32::from_str_radix(&hex[i..i + width], 16).ok())
        .collect::<Option<Vec<_>>>()?;
    Some((values, &input[end + 4..]))
}

type Parsed<'a, T> = IResult<&'a str, T>;

fn ws(input: &str) -> Parsed<'_, ()> {
    value((), multispace0).parse(input)
}

/// Keyword or type name
fn ident(input: &str) -> Parsed<'_, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_').parse(input)
}

fn digits(input: &str) -> Parsed<'_, &str> {
    take_while1(|c: char| c.is_ascii_digit()).parse(input)
}

/// `#123`
fn entity_ref(input: &str) -> Parsed<'_, Token<'_>> {
    map_res(preceded(char('#'), digits), |d: &str| {
        d.parse::<u32>().map(Token::EntityRef)
    })
    .parse(input)
}

/// `'text'`; a doubled quote stays inside the literal
fn step_string(input: &str) -> Parsed<'_, Token<'_>> {
    let (body, _) = char('\'').parse(input)?;
    let bytes = body.as_bytes();

    let mut from = 0;
    while let Some(offset) = memchr::memchr(b'\'', &bytes[from..]) {
        let quote = from + offset;
        if bytes.get(quote + 1) == Some(&b'\'') {
            from = quote + 2;
            continue;
        }
        return Ok((&body[quote + 1..], Token::String(&body[..quote])));
    }

    Err(nom::Err::Error(nom::error::Error::new(
        body,
        nom::error::ErrorKind::Char,
    )))
}

/// Integer, or float when a fraction or exponent is present
fn number(input: &str) -> Parsed<'_, Token<'_>> {
    let (rest, text) = recognize((
        opt(one_of("+-")),
        digits,
        opt(pair(char('.'), take_while(|c: char| c.is_ascii_digit()))),
        opt((one_of("eE"), opt(one_of("+-")), digits)),
    ))
    .parse(input)?;

    // lexical-core rejects a leading '+'
    let text = text.strip_prefix('+').unwrap_or(text).as_bytes();
    let token = if text.iter().any(|&b| matches!(b, b'.' | b'e' | b'E')) {
        Token::Float(lexical_core::parse(text).unwrap_or(0.0))
    } else {
        Token::Integer(lexical_core::parse(text).unwrap_or(0))
    };
    Ok((rest, token))
}

/// `.VALUE.`
fn enumeration(input: &str) -> Parsed<'_, Token<'_>> {
    map(delimited(char('.'), ident, char('.')), Token::Enum).parse(input)
}

/// `( a, b, ... )`
fn token_list(input: &str) -> Parsed<'_, Vec<Token<'_>>> {
    delimited(
        pair(char('('), ws),
        separated_list0((ws, char(','), ws), token),
        pair(ws, char(')')),
    )
    .parse(input)
}

/// `IFCLABEL('text')`
fn typed_value(input: &str) -> Parsed<'_, Token<'_>> {
    map(pair(terminated(ident, ws), token_list), |(name, args)| {
        Token::TypedValue(name, args)
    })
    .parse(input)
}

fn token(input: &str) -> Parsed<'_, Token<'_>> {
    alt((
        entity_ref,
        step_string,
        value(Token::Null, char('$')),
        value(Token::Derived, char('*')),
        enumeration,
        number,
        map(token_list, Token::List),
        typed_value,
    ))
    .parse(input)
}

/// Decode one entity instance, `#123=IFCWALL(attr1,attr2,...);`
pub fn parse_entity(input: &str) -> Result<DecodedEntity, String> {
    let mut header = (
        ws,
        preceded(char('#'), digits),
        (ws, char('='), ws),
        terminated(ident, ws),
    );
    let (rest, (_, id, _, type_name)) = header
        .parse(input)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| {
            "Expected `#<id>=<TYPE>` at start of entity".to_string()
        })?;
    let id: u32 = id
        .parse()
        .map_err(|_| format!("Entity ID {} out of range", id))?;

    let (_, tokens) =
        token_list(rest).map_err(|e| format!("Bad attribute list in #{}: {:?}", id, e))?;

    Ok(DecodedEntity {
        id: EntityId(id),
        ifc_type: IfcType::parse(type_name),
        attributes: tokens.iter().map(Token::to_attribute_value).collect(),
    })
}

/// Decode a parenthesised argument list such as the one after a header
/// record name
pub fn parse_arguments(input: &str) -> Result<Vec<AttributeValue>, String> {
    let (_, tokens) = preceded(ws, token_list)
        .parse(input)
        .map_err(|e| format!("Bad argument list: {:?}", e))?;
    Ok(tokens.iter().map(Token::to_attribute_value).collect())
}

/// Decode the entity stored at a byte range of the file
pub fn parse_entity_at(content: &str, start: usize, end: usize) -> Result<DecodedEntity, String> {
    content
        .get(start..end)
        .ok_or_else(|| format!("Invalid byte range {}..{}", start, end))
        .and_then(parse_entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole<'a>(parsed: Parsed<'a, Token<'a>>) -> Token<'a> {
        let (rest, token) = parsed.unwrap();
        assert_eq!(rest, "");
        token
    }

    #[test]
    fn test_scalar_tokens() {
        assert_eq!(whole(token("#123")), Token::EntityRef(123));
        assert_eq!(whole(token("42")), Token::Integer(42));
        assert_eq!(whole(token("-7")), Token::Integer(-7));
        assert_eq!(whole(token("1.5E-3")), Token::Float(0.0015));
        assert_eq!(whole(token("+0.25")), Token::Float(0.25));
        assert_eq!(whole(token(".T.")), Token::Enum("T"));
        assert_eq!(whole(token("$")), Token::Null);
        assert_eq!(whole(token("*")), Token::Derived);
    }

    #[test]
    fn test_strings_keep_escapes() {
        assert_eq!(whole(token("'Brick'")), Token::String("Brick"));
        assert_eq!(whole(token("'it''s'")), Token::String("it''s"));
        assert_eq!(whole(token("''")), Token::String(""));
        assert!(step_string("'never closed").is_err());
        assert!(step_string("'only ''doubled''").is_err());
    }

    #[test]
    fn test_nested_tokens() {
        assert_eq!(
            whole(token("( #1 , (2,3) , $ )")),
            Token::List(vec![
                Token::EntityRef(1),
                Token::List(vec![Token::Integer(2), Token::Integer(3)]),
                Token::Null,
            ])
        );
        assert_eq!(
            whole(token("IFCBOOLEAN(.F.)")),
            Token::TypedValue("IFCBOOLEAN", vec![Token::Enum("F")])
        );
    }

    #[test]
    fn test_decode_step_string() {
        assert_eq!(decode_step_string("plain"), "plain");
        assert_eq!(decode_step_string("it''s"), "it's");
        assert_eq!(decode_step_string("kgCO\\X2\\2082\\X0\\/kg"), "kgCO₂/kg");
        assert_eq!(decode_step_string("Stra\\X\\DFe"), "Straße");
        assert_eq!(decode_step_string("\\S\\d"), "ä");
        assert_eq!(decode_step_string("\\PA\\x"), "x");
        assert_eq!(decode_step_string("C:\\\\tmp"), "C:\\tmp");
        assert_eq!(decode_step_string("\\X2\\zz\\X0\\"), "\\X2\\zz\\X0\\");
    }

    #[test]
    fn test_parse_entity() {
        let entity = parse_entity("  #1 = IFCWALL('abc',$,#2);").unwrap();
        assert_eq!(entity.id, EntityId(1));
        assert_eq!(entity.ifc_type, IfcType::IfcWall);
        assert_eq!(entity.attributes.len(), 3);
        assert_eq!(entity.get_ref(2), Some(EntityId(2)));

        assert!(parse_entity("IFCWALL('abc');").is_err());
        assert!(parse_entity("#1=IFCWALL('abc'").is_err());
    }

    #[test]
    fn test_parse_entity_decodes_strings() {
        let entity = parse_entity(
            "#7=IFCPROPERTYSINGLEVALUE('Embodied Carbon',$,IFCLABEL('0.2 (kgCO\\X2\\2082\\X0\\/kg)'),$);",
        )
        .unwrap();
        assert_eq!(entity.get_string(2), Some("0.2 (kgCO₂/kg)"));
    }

    #[test]
    fn test_parse_entity_at_range() {
        let content = "#1=IFCSITE($);\n#2=IFCBUILDING('b',$);";
        let entity = parse_entity_at(content, 15, content.len()).unwrap();
        assert_eq!(entity.ifc_type, IfcType::IfcBuilding);
        assert!(parse_entity_at(content, 15, 400).is_err());
    }
}
