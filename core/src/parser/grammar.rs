use nom::{
    bytes::complete::{tag, take_until, take_while, take_while1},
    branch::alt,
    combinator::{all_consuming, recognize, rest, verify},
    multi::separated_list1,
    sequence::pair,
    IResult,
};

/// Separator between the field, keys and lookup of a filter key.
pub const SEPARATOR: &str = "__";

/// Parse a column identifier: letter or underscore, then alphanumerics.
pub fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// One non-empty segment, up to the next separator or the end.
fn parse_segment(input: &str) -> IResult<&str, &str> {
    verify(alt((take_until(SEPARATOR), rest)), |s: &str| !s.is_empty())(input)
}

/// Split a whole filter key into its segments: `value__a__0__gt`.
pub fn parse_segments(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(separated_list1(tag(SEPARATOR), parse_segment))(input)
}

/// Whether `name` is a complete identifier.
pub fn is_identifier(name: &str) -> bool {
    all_consuming(parse_identifier)(name).is_ok()
}
