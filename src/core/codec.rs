// Line-level encode/decode for the two record shapes kept on disk.
use serde::Serialize;

/// One credential line: `<username> <password> <role>`, space-separated.
///
/// The role is kept as raw text. Unknown role values are preserved verbatim
/// by every store operation; only account creation and the auth gate check
/// them against [`crate::core::session::Role`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// One student line: `<roll>|<name>|<mark>`, pipe-separated, mark rendered
/// to two decimals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Student {
    pub roll: i32,
    pub name: String,
    pub mark: f64,
}

/// Decode one line into a record, or encode a record back into one line.
///
/// Decoding returns `None` for lines that do not match the record shape;
/// callers treat those as opaque text, never as errors.
pub trait RecordCodec {
    type Record;

    fn decode(&self, line: &str) -> Option<Self::Record>;
    fn encode(&self, record: &Self::Record) -> String;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CredentialCodec;

impl RecordCodec for CredentialCodec {
    type Record = Credential;

    fn decode(&self, line: &str) -> Option<Credential> {
        let mut tokens = line.split_whitespace();
        let username = tokens.next()?.to_string();
        let password = tokens.next()?.to_string();
        let role = tokens.next()?.to_string();
        if tokens.next().is_some() {
            return None;
        }
        Some(Credential {
            username,
            password,
            role,
        })
    }

    fn encode(&self, record: &Credential) -> String {
        format!("{} {} {}\n", record.username, record.password, record.role)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StudentCodec;

impl RecordCodec for StudentCodec {
    type Record = Student;

    fn decode(&self, line: &str) -> Option<Student> {
        let mut fields = line.trim().split('|');
        let roll = fields.next()?;
        let name = fields.next()?;
        let mark = fields.next()?;
        if fields.next().is_some() {
            return None;
        }
        Some(Student {
            roll: lenient_int(roll),
            name: name.to_string(),
            mark: lenient_float(mark),
        })
    }

    fn encode(&self, record: &Student) -> String {
        format!("{}|{}|{:.2}\n", record.roll, record.name, record.mark)
    }
}

/// Parse the longest leading integer prefix of `text`, else 0.
///
/// This is the store's numeric policy for both file fields and console
/// input: `"12x"` is 12, `"abc"` is 0.
pub fn lenient_int(text: &str) -> i32 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    text[..end].parse().unwrap_or(0)
}

/// Parse the longest leading decimal prefix of `text`, else 0.0.
pub fn lenient_float(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let had_int_digits = end > int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if had_int_digits || frac > end + 1 {
            end = frac;
        }
    }
    text[..end].parse().unwrap_or(0.0)
}
