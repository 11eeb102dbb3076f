// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WKT (Well-Known Text) reader using nom
//!
//! Parses the bracketed WKT-1 grammar used by coordinate reference system
//! definitions: `KEYWORD[item, item, ...]` where an item is a quoted string,
//! a number, a nested node or a bare keyword (`EAST`, `NORTH`).

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::char,
    combinator::{all_consuming, map},
    multi::separated_list0,
    number::complete::double,
    sequence::{delimited, pair},
    IResult,
};

use crate::error::{Error, Result};

/// A WKT item
#[derive(Debug, Clone, PartialEq)]
pub enum WktValue {
    /// Quoted text: "WGS 84"
    Text(String),
    /// Number: 6378137.0
    Number(f64),
    /// Bare keyword: EAST
    Keyword(String),
    /// Nested node: SPHEROID[...]
    Node(WktNode),
}

/// A WKT node: keyword followed by its bracketed items
#[derive(Debug, Clone, PartialEq)]
pub struct WktNode {
    pub keyword: String,
    pub values: Vec<WktValue>,
}

impl WktNode {
    /// Depth-first search for the first node named `keyword` (case-insensitive),
    /// including this node itself
    pub fn find(&self, keyword: &str) -> Option<&WktNode> {
        if self.keyword.eq_ignore_ascii_case(keyword) {
            return Some(self);
        }
        self.children().find_map(|child| child.find(keyword))
    }

    /// Nested nodes, in order
    pub fn children(&self) -> impl Iterator<Item = &WktNode> {
        self.values.iter().filter_map(|v| match v {
            WktValue::Node(node) => Some(node),
            _ => None,
        })
    }

    /// First quoted text item (usually the node name)
    pub fn name(&self) -> Option<&str> {
        self.values.iter().find_map(|v| match v {
            WktValue::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Numeric items, in order
    pub fn numbers(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(|v| match v {
                WktValue::Number(n) => Some(*n),
                _ => None,
            })
            .collect()
    }
}

/// Skip whitespace
fn ws(input: &str) -> IResult<&str, ()> {
    map(take_while(|c: char| c.is_whitespace()), |_| ())(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// Quoted text; WKT escapes a double quote by doubling it
fn quoted(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('"'),
            separated_list0(
                pair(char('"'), char('"')),
                take_while(|c: char| c != '"'),
            ),
            char('"'),
        ),
        |parts: Vec<&str>| parts.join("\""),
    )(input)
}

/// Parse an item with optional surrounding whitespace
fn token(input: &str) -> IResult<&str, WktValue> {
    delimited(
        ws,
        alt((
            map(quoted, WktValue::Text),
            map(node, WktValue::Node), // Before keyword: both start with an identifier
            map(double, WktValue::Number),
            map(identifier, |s: &str| WktValue::Keyword(s.to_string())),
        )),
        ws,
    )(input)
}

/// Parse a node: KEYWORD[...] (parentheses are accepted as well)
fn node(input: &str) -> IResult<&str, WktNode> {
    let (input, keyword) = identifier(input)?;
    let (input, _) = ws(input)?;
    let (input, values) = alt((
        delimited(char('['), separated_list0(char(','), token), char(']')),
        delimited(char('('), separated_list0(char(','), token), char(')')),
    ))(input)?;
    Ok((
        input,
        WktNode {
            keyword: keyword.to_string(),
            values,
        },
    ))
}

/// Parse a complete WKT definition
pub fn parse_wkt(input: &str) -> Result<WktNode> {
    match all_consuming(delimited(ws, node, ws))(input) {
        Ok((_, root)) => Ok(root),
        Err(e) => Err(Error::Wkt(format!("failed to parse WKT: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spheroid() {
        let root = parse_wkt(r#"SPHEROID["WGS 84", 6378137.0, 298.257223563]"#).unwrap();
        assert_eq!(root.keyword, "SPHEROID");
        assert_eq!(root.name(), Some("WGS 84"));
        assert_eq!(root.numbers(), vec![6378137.0, 298.257223563]);
    }

    #[test]
    fn test_find_nested_node() {
        let root = parse_wkt(
            r#"GEOGCS["WGS 84",
                 DATUM["WGS_1984", SPHEROID["WGS 84", 6378137.0, 298.257223563]],
                 AXIS["Lon", EAST]]"#,
        )
        .unwrap();
        let spheroid = root.find("spheroid").unwrap();
        assert_eq!(spheroid.numbers()[0], 6378137.0);

        let axis = root.find("AXIS").unwrap();
        assert_eq!(axis.values[1], WktValue::Keyword("EAST".to_string()));
    }

    #[test]
    fn test_escaped_quote() {
        let root = parse_wkt(r#"DATUM["say ""hi""", 1]"#).unwrap();
        assert_eq!(root.name(), Some("say \"hi\""));
    }

    #[test]
    fn test_malformed_wkt() {
        assert!(parse_wkt(r#"GEOGCS["WGS 84", DATUM["x""#).is_err());
        assert!(parse_wkt("").is_err());
        assert!(parse_wkt(r#"SPHEROID["a", 1] trailing"#).is_err());
    }
}
