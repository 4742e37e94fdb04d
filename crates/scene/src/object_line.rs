//! Tokenizer for `OBJECT` lines, whose file path may contain spaces.
//!
//! The numeric block is located first; whatever precedes it is the path.

use corelib::{Vec3, vec3};

/// Scalars following the path: 9 floats and the material tag.
const TRAILING_TOKENS: usize = 10;

/// Placement fields of one `OBJECT` line.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectLine {
    pub path: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub material_type: String,
}

/// Parse the text following the `OBJECT` keyword. `None` if no path can be found.
pub fn parse_object_line(rest: &str) -> Option<ObjectLine> {
    split_at_numeric_block(rest)
        .or_else(|| split_last_tokens(rest))
        .filter(|line| !line.path.is_empty())
}

/// Primary strategy: the position starts at the first run of three plain numbers.
fn split_at_numeric_block(rest: &str) -> Option<ObjectLine> {
    let tokens = tokens_with_offsets(rest);
    let start = tokens
        .windows(3)
        .find(|w| w.iter().all(|&(_, t)| is_plain_number(t)))
        .map(|w| w[0].0)?;
    let path = rest[..start].trim();
    let mut tokens = rest[start..].split_whitespace();
    let values = take_floats(&mut tokens)?;
    let material_type = tokens.next().unwrap_or_default().to_string();
    Some(build(path, values, material_type))
}

/// Fallback: the last ten tokens are the scalars, everything before is the path.
fn split_last_tokens(rest: &str) -> Option<ObjectLine> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < TRAILING_TOKENS {
        return None;
    }
    let (path, tail) = tokens.split_at(tokens.len() - TRAILING_TOKENS);
    let mut tail = tail.iter().copied();
    let values = take_floats(&mut tail)?;
    let material_type = tail.next().unwrap_or_default().to_string();
    Some(build(&path.join(" "), values, material_type))
}

/// Whitespace-separated tokens with their byte offsets.
fn tokens_with_offsets(s: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(from)) => {
                out.push((from, &s[from..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(from) = start {
        out.push((from, &s[from..]));
    }
    out
}

/// `-?digits(.digits)?`, the shape of a hand-written scene number.
fn is_plain_number(token: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    match unsigned.split_once('.') {
        Some((int, frac)) => digits(int) && digits(frac),
        None => digits(unsigned),
    }
}

fn take_floats<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 9]> {
    let mut out = [0.0; 9];
    for slot in &mut out {
        *slot = tokens.next()?.parse().ok()?;
    }
    Some(out)
}

fn build(path: &str, v: [f32; 9], material_type: String) -> ObjectLine {
    ObjectLine {
        path: path.to_string(),
        position: vec3(v[0], v[1], v[2]),
        rotation: vec3(v[3], v[4], v[5]),
        scale: vec3(v[6], v[7], v[8]),
        material_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_with_spaces_is_kept_whole() {
        let obj = parse_object_line(" models/bike red car.obj 1 2 3 0 0 0 1 1 1 SHINY").unwrap();
        assert_eq!(obj.path, "models/bike red car.obj");
        assert_eq!(obj.position, vec3(1.0, 2.0, 3.0));
        assert_eq!(obj.rotation, Vec3::ZERO);
        assert_eq!(obj.scale, Vec3::ONE);
        assert_eq!(obj.material_type, "SHINY");
    }

    #[test]
    fn decimals_and_negatives() {
        let obj = parse_object_line("track.obj -1.5 0 2.25 -90 45 0 0.5 0.5 0.5 MATTE").unwrap();
        assert_eq!(obj.path, "track.obj");
        assert_eq!(obj.position, vec3(-1.5, 0.0, 2.25));
        assert_eq!(obj.rotation, vec3(-90.0, 45.0, 0.0));
        assert_eq!(obj.scale, Vec3::splat(0.5));
    }

    #[test]
    fn digits_inside_the_path_do_not_split_it() {
        let obj = parse_object_line("models/v2 final 3d/car.obj 0 0 0 0 0 0 1 1 1 X").unwrap();
        assert_eq!(obj.path, "models/v2 final 3d/car.obj");
    }

    #[test]
    fn missing_material_tag_is_empty() {
        let obj = parse_object_line("a.obj 1 1 1 0 0 0 2 2 2").unwrap();
        assert_eq!(obj.material_type, "");
        assert_eq!(obj.scale, Vec3::splat(2.0));
    }

    #[test]
    fn falls_back_to_trailing_tokens() {
        // Exponent notation defeats the triple search; the last ten tokens still parse.
        let obj = parse_object_line("odd name.obj 1e0 2 3 0 0 0 1 1 1 SHINY").unwrap();
        assert_eq!(obj.path, "odd name.obj");
        assert_eq!(obj.position, vec3(1.0, 2.0, 3.0));
        assert_eq!(obj.material_type, "SHINY");
    }

    #[test]
    fn plain_number_shape() {
        assert!(is_plain_number("12"));
        assert!(is_plain_number("-0.5"));
        assert!(!is_plain_number("1."));
        assert!(!is_plain_number(".5"));
        assert!(!is_plain_number("1e3"));
        assert!(!is_plain_number("3d"));
    }

    #[test]
    fn missing_path_is_rejected() {
        assert_eq!(parse_object_line(" 1 2 3 0 0 0 1 1 1 SHINY"), None);
    }

    #[test]
    fn too_few_numbers_is_rejected() {
        assert_eq!(parse_object_line("model.obj 1 2"), None);
        assert_eq!(parse_object_line(""), None);
    }
}
