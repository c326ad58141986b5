//! Parse catalog text into definition fragments

use crate::definition::{Catalog, DefValue, Definition};
use crate::errors::{DefinitionError, SourceContext};
use crate::{CatalogParser, Rule};
use pest::Parser;
use pest::error::InputLocation;
use pest::iterators::Pair;

/// Parse a catalog source into its fragments.
///
/// `name` is only used to label diagnostics.
pub fn parse_catalog(name: &str, source: &str) -> Result<Catalog, DefinitionError> {
    let ctx = SourceContext::new(name, source);
    let pairs = CatalogParser::parse(Rule::catalog, source).map_err(|e| syntax_error(&ctx, e))?;

    let mut catalog = Catalog::new();
    let mut current: Option<(String, Definition)> = None;

    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::header => {
                if let Some((name, fragment)) = current.take() {
                    catalog.insert(name, fragment);
                }
                let ident = first_inner(&pair)?;
                let name = ident.as_str().to_string();
                if catalog.get(&name).is_some() {
                    let span = pair.as_span();
                    return Err(DefinitionError::DuplicateFragment {
                        name,
                        src: ctx.named_source(),
                        span: ctx.span(span.start(), span.end() - span.start()),
                    });
                }
                current = Some((name, Definition::new()));
            }
            Rule::entry => {
                let (key, value) = parse_entry(&ctx, pair.clone())?;
                match current.as_mut() {
                    Some((_, fragment)) => {
                        fragment.set(key, value);
                    }
                    None => {
                        let span = pair.as_span();
                        return Err(DefinitionError::OrphanEntry {
                            key,
                            src: ctx.named_source(),
                            span: ctx.span(span.start(), span.end() - span.start()),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    if let Some((name, fragment)) = current.take() {
        catalog.insert(name, fragment);
    }
    Ok(catalog)
}

/// Parse a single anonymous fragment (`key = value` lines, no header).
pub fn parse_definition(name: &str, source: &str) -> Result<Definition, DefinitionError> {
    let wrapped = format!("[{}]\n{}", anonymous_header(), source);
    let catalog = parse_catalog(name, &wrapped).map_err(|e| shift_spans(e, name, source))?;
    Ok(catalog.get(anonymous_header()).cloned().unwrap_or_default())
}

fn anonymous_header() -> &'static str {
    "_"
}

/// Re-anchor diagnostics from the wrapped source onto the caller's text.
fn shift_spans(err: DefinitionError, name: &str, source: &str) -> DefinitionError {
    let ctx = SourceContext::new(name, source);
    let offset = anonymous_header().len() + 3;
    let shift = |span: miette::SourceSpan| {
        let start = span.offset().saturating_sub(offset).min(source.len());
        ctx.span(start, span.len().min(source.len() - start))
    };
    match err {
        DefinitionError::Syntax { message, span, .. } => DefinitionError::Syntax {
            message,
            src: ctx.named_source(),
            span: shift(span),
        },
        DefinitionError::InvalidNumber { message, span, .. } => DefinitionError::InvalidNumber {
            message,
            src: ctx.named_source(),
            span: shift(span),
        },
        DefinitionError::DuplicateFragment { name, span, .. } => {
            DefinitionError::DuplicateFragment {
                name,
                src: ctx.named_source(),
                span: shift(span),
            }
        }
        other => other,
    }
}

fn parse_entry(ctx: &SourceContext, pair: Pair<Rule>) -> Result<(String, DefValue), DefinitionError> {
    let mut inner = pair.into_inner();
    let key = inner
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    let Some(value) = inner.next() else {
        return Ok((key, DefValue::Text(String::new())));
    };

    match value.as_rule() {
        Rule::number => {
            let text = value.as_str();
            let span = value.as_span();
            let n: f64 = text.parse().map_err(|e: std::num::ParseFloatError| {
                DefinitionError::InvalidNumber {
                    message: e.to_string(),
                    src: ctx.named_source(),
                    span: ctx.span(span.start(), span.end() - span.start()),
                }
            })?;
            Ok((key, DefValue::Number(n)))
        }
        Rule::string => {
            let raw = value.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok((key, DefValue::Text(unescape(raw))))
        }
        other => {
            let span = value.as_span();
            Err(DefinitionError::Syntax {
                message: format!("unexpected {other:?} in entry"),
                src: ctx.named_source(),
                span: ctx.span(span.start(), span.end() - span.start()),
            })
        }
    }
}

fn first_inner<'a>(pair: &Pair<'a, Rule>) -> Result<Pair<'a, Rule>, DefinitionError> {
    pair.clone()
        .into_inner()
        .next()
        .ok_or_else(|| DefinitionError::Syntax {
            message: format!("empty {:?}", pair.as_rule()),
            src: miette::NamedSource::new("<input>", pair.as_str().to_string()),
            span: (0, pair.as_str().len()).into(),
        })
}

/// Backslash escapes: `\"` and `\\` produce the escaped character.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn syntax_error(ctx: &SourceContext, e: pest::error::Error<Rule>) -> DefinitionError {
    let (start, end) = match e.location {
        InputLocation::Pos(p) => (p, p),
        InputLocation::Span((s, end)) => (s, end),
    };
    DefinitionError::Syntax {
        message: e.variant.message().to_string(),
        src: ctx.named_source(),
        span: ctx.span(start, end.saturating_sub(start)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::keys;

    #[test]
    fn parse_fragments_in_order() {
        let input = r#"
            # wheels
            [wheel29er]
            wheel = 622
            tire = 55

            [ktm]
            name = "KTM"
            description = "KTM \"Leggero\" Cross"
            head_angle = 70.5
        "#;
        let catalog = parse_catalog("<test>", input).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["wheel29er", "ktm"]);

        let ktm = catalog.get("ktm").unwrap();
        assert_eq!(ktm.text(keys::NAME), Some("KTM"));
        assert_eq!(ktm.text(keys::DESCRIPTION), Some("KTM \"Leggero\" Cross"));
        assert_eq!(ktm.number(keys::HEAD_ANGLE), Some(70.5));
    }

    #[test]
    fn parse_trailing_comment_and_no_final_newline() {
        let catalog = parse_catalog("<test>", "[a]\nreach = 380 # mm").unwrap();
        assert_eq!(catalog.get("a").unwrap().number(keys::REACH), Some(380.0));
    }

    #[test]
    fn entry_before_header_is_rejected() {
        let err = parse_catalog("<test>", "reach = 380\n[a]\n").unwrap_err();
        assert!(matches!(err, DefinitionError::OrphanEntry { key, .. } if key == "reach"));
    }

    #[test]
    fn duplicate_fragment_is_rejected() {
        let err = parse_catalog("<test>", "[a]\nreach = 1\n[a]\nstack = 2\n").unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateFragment { name, .. } if name == "a"));
    }

    #[test]
    fn malformed_line_is_a_syntax_error() {
        let err = parse_catalog("<test>", "[a]\nreach 380\n").unwrap_err();
        assert!(matches!(err, DefinitionError::Syntax { .. }));
    }

    #[test]
    fn parse_bare_definition() {
        let def = parse_definition("<test>", "reach = 380\nstack = 610\n").unwrap();
        assert_eq!(def.number(keys::STACK), Some(610.0));
        assert!(parse_definition("<test>", "reach = \n").is_err());
    }

    #[test]
    fn parse_rule_entry() {
        let result = CatalogParser::parse(Rule::entry, "seat_size = 31.8");
        assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    }
}
