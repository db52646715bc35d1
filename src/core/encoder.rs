//! Appends JSON renderings of [`Value`]s to a byte buffer.
//!
//! No intermediate tree is built: every value is written straight into the
//! caller's buffer. Containers write a trailing `,` after each element and then
//! overwrite the last byte with the closing bracket.

use super::value::{MarshalError, Value};
use std::fmt::{self, Write as _};
use std::io::Write as _;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Append the JSON rendering of `value` to `buf`.
pub fn append_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Json(m) => append_marshalled(buf, m.marshal_json()),
        Value::Text(m) => append_marshalled(buf, m.marshal_text()),
        Value::Display(d) => {
            buf.push(b'"');
            let _ = write!(EscapeWriter(buf), "{}", d);
            buf.push(b'"');
        }
        Value::Nil | Value::Optional(None) => buf.extend_from_slice(b"\"\""),
        Value::Bool(b) => buf.extend_from_slice(if *b { b"true" } else { b"false" }),
        Value::Int(i) => push_fmt(buf, format_args!("{}", i)),
        Value::Uint(u) => push_fmt(buf, format_args!("{}", u)),
        Value::Float(f) => append_float(buf, *f),
        Value::Complex(re, im) => {
            buf.push(b'"');
            append_float_digits(buf, *re);
            buf.push(b'+');
            append_float_digits(buf, *im);
            buf.extend_from_slice(b"i\"");
        }
        Value::Str(s) => {
            buf.push(b'"');
            append_escaped_str(buf, s);
            buf.push(b'"');
        }
        Value::Seq(items) => {
            buf.push(b'[');
            if items.is_empty() {
                // placeholder for the closing rewrite
                buf.push(b',');
            }
            for item in items {
                append_value(buf, item);
                buf.push(b',');
            }
            close(buf, b']');
        }
        Value::Map(pairs) => {
            buf.push(b'{');
            if pairs.is_empty() {
                buf.push(b',');
            }
            for (key, val) in pairs {
                append_key(buf, key);
                buf.push(b':');
                append_value(buf, val);
                buf.push(b',');
            }
            close(buf, b'}');
        }
        Value::Record(record) => {
            buf.push(b'{');
            let start = buf.len();
            for field in record.exported() {
                buf.push(b'"');
                append_escaped_str(buf, &field.name);
                buf.extend_from_slice(b"\":");
                append_value(buf, &field.value);
                buf.push(b',');
            }
            if buf.len() == start {
                buf.push(b',');
            }
            close(buf, b'}');
        }
        Value::Optional(Some(inner)) => append_value(buf, inner),
        Value::Time(t) => {
            buf.push(b'"');
            push_fmt(buf, format_args!("{}", t.to_rfc3339()));
            buf.push(b'"');
        }
        Value::Address(addr) => push_fmt(buf, format_args!("\"0x{:x}\"", addr)),
    }
}

/// Append `s` with JSON string escaping, without surrounding quotes.
pub fn append_escaped_str(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b >= 0x20 && b != b'"' && b != b'\\' {
            continue;
        }
        buf.extend_from_slice(&bytes[start..i]);
        match b {
            b'"' | b'\\' => buf.extend_from_slice(&[b'\\', b]),
            b'\n' => buf.extend_from_slice(b"\\n"),
            b'\r' => buf.extend_from_slice(b"\\r"),
            b'\t' => buf.extend_from_slice(b"\\t"),
            _ => buf.extend_from_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[usize::from(b >> 4)],
                HEX[usize::from(b & 0xF)],
            ]),
        }
        start = i + 1;
    }
    buf.extend_from_slice(&bytes[start..]);
}

/// Append raw bytes with JSON string escaping. Every byte that is not part of
/// a valid UTF-8 sequence becomes the `\ufffd` escape.
pub fn append_escaped(buf: &mut Vec<u8>, bytes: &[u8]) {
    for chunk in bytes.utf8_chunks() {
        append_escaped_str(buf, chunk.valid());
        for _ in chunk.invalid() {
            buf.extend_from_slice(b"\\ufffd");
        }
    }
}

/// `fmt::Write` adapter that escapes everything written through it.
pub struct EscapeWriter<'a>(pub &'a mut Vec<u8>);

impl fmt::Write for EscapeWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        append_escaped_str(self.0, s);
        Ok(())
    }
}

fn append_marshalled(buf: &mut Vec<u8>, result: Result<Vec<u8>, MarshalError>) {
    buf.push(b'"');
    match result {
        Ok(body) => append_escaped(buf, &body),
        Err(err) => {
            let _ = write!(EscapeWriter(buf), "{}", err);
        }
    }
    buf.push(b'"');
}

/// Map keys must end up as JSON strings; anything else is rendered and then
/// quoted as text.
fn append_key(buf: &mut Vec<u8>, key: &Value) {
    if key.encodes_as_string() {
        append_value(buf, key);
        return;
    }
    let mut scratch = Vec::new();
    append_value(&mut scratch, key);
    buf.push(b'"');
    append_escaped(buf, &scratch);
    buf.push(b'"');
}

fn append_float(buf: &mut Vec<u8>, f: f64) {
    if f.is_finite() {
        append_float_digits(buf, f);
    } else {
        buf.push(b'"');
        append_float_digits(buf, f);
        buf.push(b'"');
    }
}

/// Shortest round-trip decimal, never in exponent form.
fn append_float_digits(buf: &mut Vec<u8>, f: f64) {
    if f.is_nan() {
        buf.extend_from_slice(b"NaN");
    } else if f.is_infinite() {
        buf.extend_from_slice(if f > 0.0 { b"+Inf" } else { b"-Inf" });
    } else {
        push_fmt(buf, format_args!("{}", f));
    }
}

fn close(buf: &mut Vec<u8>, bracket: u8) {
    if let Some(last) = buf.last_mut() {
        *last = bracket;
    }
}

#[inline]
fn push_fmt(buf: &mut Vec<u8>, args: fmt::Arguments<'_>) {
    // writing into a Vec cannot fail
    let _ = buf.write_fmt(args);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{MarshalJson, MarshalText, Record};
    use std::collections::BTreeMap;

    fn encode(value: impl Into<Value>) -> String {
        let mut buf = Vec::new();
        append_value(&mut buf, &value.into());
        String::from_utf8(buf).unwrap()
    }

    struct Failing;

    impl MarshalJson for Failing {
        fn marshal_json(&self) -> Result<Vec<u8>, MarshalError> {
            Err("broken \"marshal\"".into())
        }
    }

    struct Ip([u8; 4]);

    impl MarshalText for Ip {
        fn marshal_text(&self) -> Result<Vec<u8>, MarshalError> {
            let [a, b, c, d] = self.0;
            Ok(format!("{}.{}.{}.{}", a, b, c, d).into_bytes())
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(encode(true), "true");
        assert_eq!(encode(-42i32), "-42");
        assert_eq!(encode(42u64), "42");
        assert_eq!(encode(1.5f64), "1.5");
        assert_eq!(encode(3.0f64), "3");
        assert_eq!(encode(0.1f64), "0.1");
        assert_eq!(encode(Value::Nil), "\"\"");
        assert_eq!(encode(None::<u8>), "\"\"");
        assert_eq!(encode(Some(7u8)), "7");
    }

    #[test]
    fn test_non_finite_floats_are_quoted() {
        assert_eq!(encode(f64::NAN), "\"NaN\"");
        assert_eq!(encode(f64::INFINITY), "\"+Inf\"");
        assert_eq!(encode(f64::NEG_INFINITY), "\"-Inf\"");
    }

    #[test]
    fn test_complex() {
        assert_eq!(encode(Value::complex(1.5, 2.0)), "\"1.5+2i\"");
        assert_eq!(encode(Value::complex(0.0, -1.0)), "\"0+-1i\"");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(encode("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(encode("l1\nl2\r\t"), r#""l1\nl2\r\t""#);
        assert_eq!(encode("\u{1}x\u{1f}"), r#""\u0001x\u001f""#);
        assert_eq!(encode("<a&b>"), "\"<a&b>\"");
        assert_eq!(encode("héllo ✓"), "\"héllo ✓\"");
    }

    #[test]
    fn test_invalid_utf8_becomes_replacement() {
        let mut buf = Vec::new();
        append_escaped(&mut buf, b"ok\xffend\xe2\x82");
        assert_eq!(buf, br"ok\ufffdend\ufffd\ufffd".to_vec());
    }

    #[test]
    fn test_sequences() {
        assert_eq!(encode(Vec::<i32>::new()), "[]");
        assert_eq!(encode(vec![1, 2, 3]), "[1,2,3]");
        assert_eq!(encode(["a", "b"]), r#"["a","b"]"#);
        assert_eq!(encode(vec![Vec::<u8>::new(), vec![1]]), "[[],[1]]");
    }

    #[test]
    fn test_maps() {
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(encode(map), r#"{"a":1,"b":2}"#);

        let numeric = Value::map(vec![(1, "one"), (2, "two")]);
        assert_eq!(encode(numeric), r#"{"1":"one","2":"two"}"#);
    }

    #[test]
    fn test_empty_map_encodes_as_braces() {
        // Earlier releases rewrote the opening brace here and emitted a lone `}`.
        assert_eq!(encode(BTreeMap::<String, i32>::new()), "{}");
        assert_eq!(encode(Record::new()), "{}");
        assert_eq!(encode(Record::new().hidden("x", 1)), "{}");
    }

    #[test]
    fn test_record_uses_exported_fields() {
        let record = Record::new()
            .field("Name", "api")
            .hidden("token", "secret")
            .field("Tags", vec!["a"]);
        assert_eq!(encode(record), r#"{"Name":"api","Tags":["a"]}"#);
    }

    #[test]
    fn test_capabilities_take_precedence() {
        assert_eq!(encode(Value::json(vec![1, 2])), r#""[1,2]""#);
        assert_eq!(
            encode(Value::Json(std::sync::Arc::new(Failing))),
            r#""broken \"marshal\"""#
        );
        assert_eq!(encode(Value::text(Ip([10, 0, 0, 1]))), "\"10.0.0.1\"");
        assert_eq!(
            encode(Value::display(std::net::Ipv4Addr::LOCALHOST)),
            "\"127.0.0.1\""
        );
    }

    #[test]
    fn test_address_is_hex_string() {
        let out = encode(Value::Address(0xdead_beef));
        assert_eq!(out, "\"0xdeadbeef\"");
    }

    #[test]
    fn test_escape_writer() {
        let mut buf = Vec::new();
        write!(EscapeWriter(&mut buf), "{}\n{}", "a", 1).unwrap();
        assert_eq!(buf, br"a\n1".to_vec());
    }
}
