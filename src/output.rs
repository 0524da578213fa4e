use eyre::Result;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::TranscriptionResult;

/// Render the artifact body: pretty JSON with 4-space indentation, non-ASCII kept literal
pub fn render_artifact(result: &TranscriptionResult) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    result.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}
