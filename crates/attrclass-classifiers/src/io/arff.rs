//! ARFF reader (dense format, numeric and nominal attributes).
use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::data_handling::{Attribute, AttributeKind, RawDataset};
use crate::error::{ClassifierError, Result};
use crate::io::{is_missing, read_to_string};

/// Read an ARFF file.
pub fn read_arff<P: AsRef<Path>>(path: P) -> Result<RawDataset> {
    let path = path.as_ref();
    let content = read_to_string(path)?;
    parse_arff(&content).map_err(|e| match e {
        ClassifierError::DatasetParse(msg) => {
            ClassifierError::DatasetParse(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Parse ARFF content already held in memory.
pub fn parse_arff(content: &str) -> Result<RawDataset> {
    let mut relation = String::new();
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut seen = HashSet::new();
    let mut data_start = None;

    for (line_idx, line) in content.lines().enumerate() {
        let line_no = line_idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let (keyword, rest) = split_keyword(trimmed);
        match keyword.to_ascii_lowercase().as_str() {
            "@relation" => {
                let (name, _) = take_name(rest, line_no)?;
                relation = name;
            }
            "@attribute" => {
                let (name, kind) = take_name(rest, line_no)?;
                if !seen.insert(name.clone()) {
                    return Err(parse_error(line_no, format!("duplicate attribute '{}'", name)));
                }
                let kind = parse_kind(kind.trim(), line_no)?;
                attributes.push(Attribute { name, kind });
            }
            "@data" => {
                data_start = Some(line_idx + 1);
                break;
            }
            other => {
                return Err(parse_error(line_no, format!("unexpected header line starting with '{}'", other)));
            }
        }
    }

    let Some(data_start) = data_start else {
        return Err(ClassifierError::DatasetParse("missing @data section".to_string()));
    };
    if attributes.is_empty() {
        return Err(ClassifierError::DatasetParse("no @attribute declarations".to_string()));
    }

    let rows = parse_data_section(content, data_start, &attributes)?;
    log::debug!(
        "Parsed ARFF relation '{}' with {} attributes and {} records",
        relation,
        attributes.len(),
        rows.len()
    );
    RawDataset::from_rows(relation, attributes, rows)
}

fn parse_data_section(content: &str, data_start: usize, attributes: &[Attribute]) -> Result<Vec<Vec<f64>>> {
    let mut rows = Vec::new();
    for (offset, line) in content.lines().skip(data_start).enumerate() {
        let line_no = data_start + offset + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        if trimmed.starts_with('{') {
            return Err(parse_error(line_no, "sparse ARFF records are not supported".to_string()));
        }
        let (normalized, quote) = normalize_record(trimmed);
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .quote(quote)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(normalized.as_bytes());
        let Some(record) = reader.records().next() else {
            continue;
        };
        let record = record.map_err(|e| parse_error(line_no, format!("malformed record: {}", e)))?;
        if record.len() != attributes.len() {
            return Err(parse_error(
                line_no,
                format!("expected {} values, found {}", attributes.len(), record.len()),
            ));
        }
        let mut row = Vec::with_capacity(attributes.len());
        for (field, attr) in record.iter().zip(attributes) {
            row.push(parse_cell(field, attr, line_no)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Drop unquoted whitespace around delimiters so a quote opening a field is
/// its first byte, and pick the quote character the record uses first.
/// A record mixing both quote styles keeps single quotes as delimiters.
fn normalize_record(line: &str) -> (String, u8) {
    let quote = match (line.find('\''), line.find('"')) {
        (Some(s), Some(d)) if d < s => b'"',
        (None, Some(_)) => b'"',
        _ => b'\'',
    };
    let quote_char = quote as char;
    let mut out = String::with_capacity(line.len());
    let mut in_quotes = false;
    let mut field_start = true;
    for c in line.chars() {
        if in_quotes {
            out.push(c);
            if c == quote_char {
                in_quotes = false;
            }
            continue;
        }
        match c {
            c if c == quote_char => {
                in_quotes = true;
                field_start = false;
                out.push(c);
            }
            ',' => {
                while out.ends_with(char::is_whitespace) {
                    out.pop();
                }
                out.push(',');
                field_start = true;
            }
            c if c.is_whitespace() && field_start => {}
            c => {
                field_start = false;
                out.push(c);
            }
        }
    }
    (out, quote)
}

fn parse_cell(field: &str, attr: &Attribute, line_no: usize) -> Result<f64> {
    if is_missing(field) {
        return Ok(f64::NAN);
    }
    match &attr.kind {
        AttributeKind::Numeric => field.parse::<f64>().map_err(|_| {
            parse_error(line_no, format!("invalid numeric value '{}' for '{}'", field, attr.name))
        }),
        AttributeKind::Nominal(labels) => {
            let value = unquote(field);
            labels
                .iter()
                .position(|l| l == value)
                .map(|idx| idx as f64)
                .ok_or_else(|| {
                    parse_error(line_no, format!("value '{}' is not declared for '{}'", value, attr.name))
                })
        }
    }
}

fn parse_kind(raw: &str, line_no: usize) -> Result<AttributeKind> {
    if let Some(inner) = raw.strip_prefix('{') {
        let Some(inner) = inner.trim_end().strip_suffix('}') else {
            return Err(parse_error(line_no, "unterminated nominal domain".to_string()));
        };
        let labels = split_labels(inner, line_no)?;
        if labels.is_empty() {
            return Err(parse_error(line_no, "empty nominal domain".to_string()));
        }
        return Ok(AttributeKind::Nominal(labels));
    }
    match raw.to_ascii_lowercase().as_str() {
        "numeric" | "real" | "integer" => Ok(AttributeKind::Numeric),
        other => Err(parse_error(line_no, format!("unsupported attribute type '{}'", other))),
    }
}

fn split_labels(inner: &str, line_no: usize) -> Result<Vec<String>> {
    let (normalized, quote) = normalize_record(inner.trim());
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .quote(quote)
        .trim(Trim::All)
        .from_reader(normalized.as_bytes());
    let mut labels = Vec::new();
    if let Some(record) = reader.records().next() {
        let record = record.map_err(|e| parse_error(line_no, format!("malformed nominal domain: {}", e)))?;
        for label in record.iter() {
            let label = unquote(label);
            if labels.iter().any(|l: &String| l == label) {
                return Err(parse_error(line_no, format!("duplicate nominal value '{}'", label)));
            }
            labels.push(label.to_string());
        }
    }
    Ok(labels)
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(idx) => (&line[..idx], line[idx..].trim_start()),
        None => (line, ""),
    }
}

/// Take a possibly quoted name off the front of `rest`.
fn take_name(rest: &str, line_no: usize) -> Result<(String, &str)> {
    let rest = rest.trim_start();
    let mut chars = rest.char_indices();
    match chars.next() {
        None => Err(parse_error(line_no, "missing name".to_string())),
        Some((_, quote @ ('\'' | '"'))) => {
            for (idx, c) in chars {
                if c == quote {
                    return Ok((rest[1..idx].to_string(), &rest[idx + 1..]));
                }
            }
            Err(parse_error(line_no, "unterminated quoted name".to_string()))
        }
        Some(_) => {
            let (name, tail) = split_keyword(rest);
            Ok((name.to_string(), tail))
        }
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)) {
            return inner;
        }
    }
    value
}

fn parse_error(line_no: usize, msg: String) -> ClassifierError {
    ClassifierError::DatasetParse(format!("line {}: {}", line_no, msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "% comment\n\
        @RELATION weather\n\
        \n\
        @ATTRIBUTE 'outlook temp' NUMERIC\n\
        @attribute humidity real\n\
        @attribute play {yes, no}\n\
        @data\n\
        1.5, 80, yes\n\
        % skipped\n\
        ?, 70, 'no'\n";

    #[test]
    fn parses_header_and_records() {
        let ds = parse_arff(SMALL).unwrap();
        assert_eq!(ds.relation(), "weather");
        assert_eq!(ds.num_attributes(), 3);
        assert_eq!(ds.attributes()[0].name, "outlook temp");
        assert_eq!(
            ds.attributes()[2].labels().unwrap(),
            &["yes".to_string(), "no".to_string()]
        );
        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.value(0, 0), 1.5);
        assert!(ds.value(1, 0).is_nan());
        assert_eq!(ds.value(1, 2), 1.0);
    }

    #[test]
    fn quoted_values_may_contain_commas() {
        let content = "@relation r\n\
            @attribute a numeric\n\
            @attribute c1 {'x,y', plain}\n\
            @attribute c2 {\"u,v\", other}\n\
            @data\n\
            1, 'x,y', other\n\
            2,  plain , \"u,v\"\n";
        let ds = parse_arff(content).unwrap();
        assert_eq!(
            ds.attributes()[1].labels().unwrap(),
            &["x,y".to_string(), "plain".to_string()]
        );
        assert_eq!(
            ds.attributes()[2].labels().unwrap(),
            &["u,v".to_string(), "other".to_string()]
        );
        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.value(0, 1), 0.0);
        assert_eq!(ds.value(0, 2), 1.0);
        assert_eq!(ds.value(1, 0), 2.0);
        assert_eq!(ds.value(1, 1), 1.0);
        assert_eq!(ds.value(1, 2), 0.0);
    }

    #[test]
    fn normalize_record_picks_first_quote_style() {
        assert_eq!(normalize_record("1, \"a, b\" ,c"), ("1,\"a, b\",c".to_string(), b'"'));
        assert_eq!(normalize_record("'it\"s', 2"), ("'it\"s',2".to_string(), b'\''));
    }

    #[test]
    fn rejects_undeclared_nominal_value() {
        let content = "@relation r\n@attribute a numeric\n@attribute c {x,y}\n@data\n1,z\n";
        let err = parse_arff(content).unwrap_err();
        assert!(err.to_string().contains("line 5"), "{}", err);
    }

    #[test]
    fn rejects_wrong_arity_and_bad_numbers() {
        let content = "@relation r\n@attribute a numeric\n@attribute c {x,y}\n@data\n1\n";
        assert!(parse_arff(content).is_err());
        let content = "@relation r\n@attribute a numeric\n@attribute c {x,y}\n@data\nabc,x\n";
        assert!(parse_arff(content).is_err());
    }

    #[test]
    fn rejects_unsupported_types_and_sparse_rows() {
        let content = "@relation r\n@attribute s string\n@data\nfoo\n";
        assert!(parse_arff(content).is_err());
        let content = "@relation r\n@attribute a numeric\n@attribute c {x,y}\n@data\n{0 1, 1 x}\n";
        assert!(parse_arff(content).is_err());
    }

    #[test]
    fn requires_data_section() {
        let content = "@relation r\n@attribute a numeric\n";
        let err = parse_arff(content).unwrap_err();
        assert!(err.to_string().contains("@data"));
    }
}
