//! Call-site resolution for the dual-mode logging methods
//!
//! `logger.info(message, args)` accepts either a printf-style template with
//! positional arguments or a plain message followed by alternating key/value
//! pairs. [`LogCall::resolve`] decides once, at the call boundary:
//!
//! - the message contains at least one recognised verb and the number of
//!   verbs equals the number of arguments: [`LogCall::Format`]
//! - anything else: [`LogCall::Structured`], message kept verbatim and the
//!   arguments paired up; an odd trailing value lands under [`EXTRA_KEY`]
//!
//! The printf dialect covers `%v %s %d %i %t %q %f %F %e %E %g %G %x %X %o
//! %b %c` with `-+# 0` flags, width and precision. `%%` is a literal percent.

use super::attribute::{Attribute, Value};
use std::fmt::Write as _;

/// Key used for the unpaired trailing value of a structured call
pub const EXTRA_KEY: &str = "extra";

const VERBS: &str = "vsditqfFeEgGxXobc";

/// A resolved logging call
#[derive(Debug, Clone, Copy)]
pub enum LogCall<'a> {
    /// Render `template` with positional `args`; no attributes
    Format { template: &'a str, args: &'a [Value] },
    /// Keep `message`, turn `pairs` into attributes
    Structured { message: &'a str, pairs: &'a [Value] },
}

impl<'a> LogCall<'a> {
    pub fn resolve(message: &'a str, args: &'a [Value]) -> Self {
        let verbs = count_verbs(message);
        if verbs > 0 && verbs == args.len() {
            LogCall::Format {
                template: message,
                args,
            }
        } else {
            LogCall::Structured {
                message,
                pairs: args,
            }
        }
    }

    /// Force printf rendering regardless of argument count
    pub fn format(template: &'a str, args: &'a [Value]) -> Self {
        LogCall::Format { template, args }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, LogCall::Format { .. })
    }

    /// Produce the final message and call-site attributes
    pub fn into_parts(self) -> (String, Vec<Attribute>) {
        match self {
            LogCall::Format { template, args } => (sprintf(template, args), Vec::new()),
            LogCall::Structured { message, pairs } => (message.to_string(), pair_attributes(pairs)),
        }
    }
}

/// Pair alternating key/value arguments into attributes
///
/// Keys that are not strings are rendered with `Display`.
pub fn pair_attributes(pairs: &[Value]) -> Vec<Attribute> {
    pairs
        .chunks(2)
        .map(|chunk| match chunk {
            [key, value] => Attribute::new(key_string(key), value.clone()),
            [extra] => Attribute::new(EXTRA_KEY, extra.clone()),
            _ => unreachable!("chunks(2) yields one or two items"),
        })
        .collect()
}

fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Spec {
    minus: bool,
    plus: bool,
    sharp: bool,
    zero: bool,
    space: bool,
    width: Option<usize>,
    precision: Option<usize>,
    verb: char,
}

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Percent,
    Verb(Spec),
    BadVerb(Spec),
    NoVerb,
}

fn parse(template: &str) -> Vec<Piece<'_>> {
    let bytes = template.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        if start < i {
            pieces.push(Piece::Literal(&template[start..i]));
        }
        i += 1;

        let mut spec = Spec::default();
        while i < bytes.len() {
            match bytes[i] {
                b'-' => spec.minus = true,
                b'+' => spec.plus = true,
                b'#' => spec.sharp = true,
                b'0' => spec.zero = true,
                b' ' => spec.space = true,
                _ => break,
            }
            i += 1;
        }
        let (width, next) = parse_number(bytes, i);
        spec.width = width;
        i = next;
        if i < bytes.len() && bytes[i] == b'.' {
            let (precision, next) = parse_number(bytes, i + 1);
            spec.precision = Some(precision.unwrap_or(0));
            i = next;
        }

        match template[i..].chars().next() {
            None => pieces.push(Piece::NoVerb),
            Some('%') if spec == Spec::default() => {
                pieces.push(Piece::Percent);
                i += 1;
            }
            Some(verb) => {
                spec.verb = verb;
                if VERBS.contains(verb) {
                    pieces.push(Piece::Verb(spec));
                } else {
                    pieces.push(Piece::BadVerb(spec));
                }
                i += verb.len_utf8();
            }
        }
        start = i;
    }

    if start < bytes.len() {
        pieces.push(Piece::Literal(&template[start..]));
    }
    pieces
}

fn parse_number(bytes: &[u8], mut i: usize) -> (Option<usize>, usize) {
    let begin = i;
    let mut n: usize = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        n = n.saturating_mul(10).saturating_add((bytes[i] - b'0') as usize);
        i += 1;
    }
    if i == begin {
        (None, i)
    } else {
        (Some(n), i)
    }
}

/// Number of recognised verbs in `template` (`%%` excluded)
pub fn count_verbs(template: &str) -> usize {
    if !template.contains('%') {
        return 0;
    }
    parse(template)
        .iter()
        .filter(|piece| matches!(piece, Piece::Verb(_)))
        .count()
}

/// Render a printf-style template
///
/// Mismatches never fail: a missing argument renders as `%!v(MISSING)`, a
/// verb that does not fit the value as `%!d(string=x)`, surplus arguments are
/// appended as `%!(EXTRA int=1, string=x)`.
pub fn sprintf(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut args_iter = args.iter();

    for piece in parse(template) {
        match piece {
            Piece::Literal(s) => out.push_str(s),
            Piece::Percent => out.push('%'),
            Piece::NoVerb => out.push_str("%!(NOVERB)"),
            Piece::Verb(spec) | Piece::BadVerb(spec) => match args_iter.next() {
                None => {
                    let _ = write!(out, "%!{}(MISSING)", spec.verb);
                }
                Some(value) => match render(&spec, value) {
                    Some(rendered) => out.push_str(&pad(&spec, rendered)),
                    None => {
                        let _ = write!(out, "%!{}({}={})", spec.verb, value.kind(), value);
                    }
                },
            },
        }
    }

    let extra: Vec<String> = args_iter
        .map(|value| format!("{}={}", value.kind(), value))
        .collect();
    if !extra.is_empty() {
        let _ = write!(out, "%!(EXTRA {})", extra.join(", "));
    }
    out
}

fn render(spec: &Spec, value: &Value) -> Option<String> {
    match spec.verb {
        'v' => Some(value.to_string()),
        's' => Some(match spec.precision {
            Some(p) => value.to_string().chars().take(p).collect(),
            None => value.to_string(),
        }),
        'q' => Some(format!("{:?}", value.to_string())),
        'd' | 'i' => match value {
            Value::Int(i) => Some(signed(spec, *i < 0, i.unsigned_abs().to_string())),
            _ => None,
        },
        't' => match value {
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        },
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
            let f = match value {
                Value::Float(f) => *f,
                Value::Int(i) => *i as f64,
                _ => return None,
            };
            let body = match spec.verb {
                'f' | 'F' => format!("{:.*}", spec.precision.unwrap_or(6), f.abs()),
                'e' => format!("{:.*e}", spec.precision.unwrap_or(6), f.abs()),
                'E' => format!("{:.*E}", spec.precision.unwrap_or(6), f.abs()),
                _ => match spec.precision {
                    Some(p) => format!("{:.*}", p, f.abs()),
                    None => format!("{}", f.abs()),
                },
            };
            Some(signed(spec, f.is_sign_negative() && f != 0.0, body))
        }
        'x' | 'X' | 'o' | 'b' => match value {
            Value::Int(i) => {
                let magnitude = i.unsigned_abs();
                let (digits, marker) = match spec.verb {
                    'x' => (format!("{:x}", magnitude), "0x"),
                    'X' => (format!("{:X}", magnitude), "0X"),
                    'o' => (format!("{:o}", magnitude), "0"),
                    _ => (format!("{:b}", magnitude), "0b"),
                };
                let body = if spec.sharp {
                    format!("{}{}", marker, digits)
                } else {
                    digits
                };
                Some(signed(spec, *i < 0, body))
            }
            Value::String(s) if spec.verb == 'x' || spec.verb == 'X' => {
                let mut hex = String::with_capacity(s.len() * 2);
                for byte in s.bytes() {
                    if spec.verb == 'x' {
                        let _ = write!(hex, "{:02x}", byte);
                    } else {
                        let _ = write!(hex, "{:02X}", byte);
                    }
                }
                Some(hex)
            }
            _ => None,
        },
        'c' => match value {
            Value::Int(i) => u32::try_from(*i)
                .ok()
                .and_then(char::from_u32)
                .map(String::from),
            _ => None,
        },
        _ => None,
    }
}

fn signed(spec: &Spec, negative: bool, body: String) -> String {
    if negative {
        format!("-{}", body)
    } else if spec.plus {
        format!("+{}", body)
    } else if spec.space {
        format!(" {}", body)
    } else {
        body
    }
}

fn is_numeric_verb(verb: char) -> bool {
    "difFeEgGxXob".contains(verb)
}

fn pad(spec: &Spec, rendered: String) -> String {
    let width = match spec.width {
        Some(w) => w,
        None => return rendered,
    };
    let len = rendered.chars().count();
    if len >= width {
        return rendered;
    }
    let fill = width - len;

    if spec.minus {
        format!("{}{}", rendered, " ".repeat(fill))
    } else if spec.zero && is_numeric_verb(spec.verb) {
        // Zeros go after the sign and any radix marker
        let sign_len = match rendered.chars().next() {
            Some('-' | '+' | ' ') => 1,
            _ => 0,
        };
        let marker_len = if spec.sharp {
            ["0x", "0X", "0b"]
                .iter()
                .find(|m| rendered[sign_len..].starts_with(**m))
                .map_or(0, |m| m.len())
        } else {
            0
        };
        let (head, digits) = rendered.split_at(sign_len + marker_len);
        format!("{}{}{}", head, "0".repeat(fill), digits)
    } else {
        format!("{}{}", " ".repeat(fill), rendered)
    }
}
