// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `%(key)s` template rendering
//!
//! Supported directives:
//!
//! - `%(key)s` - value as text
//! - `%(key)d`, `%(key)i` - number truncated to an integer
//! - `%(key)f`, `%(key).Nf` - number with 6 or `N` decimals
//! - `%%` - a literal `%`

use crate::data::{ReportData, ReportValue};
use crate::error::{ReportError, Result};

/// Render a template against report data
pub fn render(template: &str, data: &ReportData) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let directive_start = template.len() - rest.len() + pos;
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('%') {
            out.push('%');
            rest = tail;
            continue;
        }

        let Some(body) = after.strip_prefix('(') else {
            return Err(ReportError::directive(directive_start, "expected '(' or '%' after '%'"));
        };
        let close = body
            .find(')')
            .ok_or_else(|| ReportError::directive(directive_start, "unclosed '('"))?;
        let key = &body[..close];
        let spec = &body[close + 1..];

        let (precision, spec) = match spec.strip_prefix('.') {
            Some(digits) => {
                let len = digits.bytes().take_while(u8::is_ascii_digit).count();
                let precision = digits[..len]
                    .parse::<usize>()
                    .map_err(|_| {
                        ReportError::directive(directive_start, "expected precision after '.'")
                    })?;
                (Some(precision), &digits[len..])
            }
            None => (None, spec),
        };

        let conversion = spec
            .chars()
            .next()
            .ok_or_else(|| ReportError::directive(directive_start, "missing conversion"))?;
        let value = data
            .get(key)
            .ok_or_else(|| ReportError::MissingKey(key.to_string()))?;
        out.push_str(&format_value(key, value, conversion, precision, directive_start)?);

        rest = &spec[conversion.len_utf8()..];
    }

    out.push_str(rest);
    Ok(out)
}

fn format_value(
    key: &str,
    value: &ReportValue,
    conversion: char,
    precision: Option<usize>,
    position: usize,
) -> Result<String> {
    let number = || {
        value.as_number().ok_or_else(|| ReportError::NotANumber {
            key: key.to_string(),
            conversion,
        })
    };

    match conversion {
        's' => Ok(value.to_string()),
        'd' | 'i' => Ok(format!("{}", number()?.trunc() as i64)),
        'f' => Ok(format!("{:.*}", precision.unwrap_or(6), number()?)),
        other => Err(ReportError::directive(
            position,
            format!("unsupported conversion '{}'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ReportData {
        let mut data = ReportData::new();
        data.insert_text("Name", "Terrace");
        data.insert_number("BuildingEC", 3810.4567);
        data.insert_number("Count", 7.9);
        data
    }

    #[test]
    fn test_conversions() {
        let out = render("%(Name)s: %(BuildingEC).1f kg, %(Count)d items, %(Count)i", &data()).unwrap();
        assert_eq!(out, "Terrace: 3810.5 kg, 7 items, 7");
    }

    #[test]
    fn test_default_float_precision_and_percent() {
        let out = render("%(Count)f is 100%%", &data()).unwrap();
        assert_eq!(out, "7.900000 is 100%");
    }

    #[test]
    fn test_text_passes_unicode_through() {
        let out = render("## %(Name)s · kgCO₂ %(BuildingEC).0f", &data()).unwrap();
        assert_eq!(out, "## Terrace · kgCO₂ 3810");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(render("%(Missing)s", &data()), Err(ReportError::MissingKey(k)) if k == "Missing"));
        assert!(matches!(render("%(Name)d", &data()), Err(ReportError::NotANumber { .. })));
        assert!(matches!(render("50% off", &data()), Err(ReportError::InvalidDirective { position: 2, .. })));
        assert!(matches!(render("%(Name", &data()), Err(ReportError::InvalidDirective { .. })));
        assert!(matches!(render("%(Name)x", &data()), Err(ReportError::InvalidDirective { .. })));
        assert!(matches!(render("%(Name).f", &data()), Err(ReportError::InvalidDirective { .. })));
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(render("no directives", &data()).unwrap(), "no directives");
    }
}
