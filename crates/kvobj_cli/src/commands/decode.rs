//! Decode command implementation.

use clap::ValueEnum;
use kvobj_core::{
    process_resp_array_output, process_resp_array_output_as_pairs,
    process_resp_single_token_output, FooterBuffer, SessionConfig,
};
use kvobj_resp::RespReader;
use kvobj_storage::ObjectOutput;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// How a frame is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Array of tokens, error frame, or a lone token.
    Array,
    /// Scan reply: cursor followed by an array of tokens.
    Scan,
    /// Array of alternating fields and values.
    Pairs,
    /// Exactly one length-prefixed token.
    Token,
}

/// Decode result.
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    /// Interpretation used.
    pub mode: DecodeMode,
    /// Capsule shape the frame was decoded from (`inline` or `rented`).
    pub capsule: &'static str,
    /// Frame size in bytes.
    pub bytes: usize,
    /// Whether the frame decoded at all.
    pub decoded: bool,
    /// Array slots; `null` marks a nil or malformed token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<Option<String>>>,
    /// Field/value pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairs: Option<Vec<(String, String)>>,
    /// Single token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Error frame message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecodeReport {
    fn new(mode: DecodeMode, output: &ObjectOutput<'_>) -> Self {
        Self {
            mode,
            capsule: if output.is_inline() { "inline" } else { "rented" },
            bytes: output.len(),
            decoded: false,
            elements: None,
            pairs: None,
            token: None,
            error: None,
        }
    }
}

/// Runs the decode command.
pub fn run(
    input: &Path,
    mode: DecodeMode,
    rented: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = read_frame(input)?;
    debug!(path = %input.display(), bytes = frame.len(), "read frame");

    let report = decode(&frame, mode, rented, &SessionConfig::default());
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => print!("{}", render_text(&report)),
        other => return Err(format!("Unknown output format: {other}").into()),
    }
    Ok(())
}

/// Decodes `frame` the way the command layer would after an engine call.
///
/// Frames larger than the configured footer spill into a rented block;
/// `rented` forces the rented shape for any size.
pub fn decode(
    frame: &[u8],
    mode: DecodeMode,
    rented: bool,
    config: &SessionConfig,
) -> DecodeReport {
    let pool = config.memory_pool();
    let mut footer = FooterBuffer::new(config);
    let mut output = if rented {
        ObjectOutput::rented(pool.rent(frame.len()))
    } else {
        footer.output()
    };
    output.write(&pool, frame);

    let mut report = DecodeReport::new(mode, &output);
    match mode {
        DecodeMode::Array | DecodeMode::Scan => {
            process_resp_array_output(output, mode == DecodeMode::Scan, |decoded| {
                report.decoded = decoded.elements.is_some() || decoded.error.is_some();
                report.elements = decoded
                    .elements
                    .map(|slots| slots.into_iter().map(|s| s.map(lossy)).collect());
                report.error = decoded.error;
            });
        }
        DecodeMode::Pairs if has_odd_length(frame) => {
            output.release();
            report.error = Some("pair frame holds an odd number of tokens".to_string());
        }
        DecodeMode::Pairs => {
            process_resp_array_output_as_pairs(output, |decoded| {
                report.decoded = decoded.pairs.is_some() || decoded.error.is_some();
                report.pairs = decoded.pairs.map(|pairs| {
                    pairs
                        .into_iter()
                        .map(|(field, value)| (lossy(field), lossy(value)))
                        .collect()
                });
                report.error = decoded.error;
            });
        }
        DecodeMode::Token => {
            process_resp_single_token_output(output, |token| {
                report.decoded = token.is_some();
                report.token = token.map(lossy);
            });
        }
    }
    report
}

/// Renders a report as human-readable text.
pub fn render_text(report: &DecodeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:?} frame, {} bytes ({})",
        report.mode, report.bytes, report.capsule
    );

    if let Some(error) = &report.error {
        let _ = writeln!(out, "error: {error}");
    }
    if let Some(elements) = &report.elements {
        for (index, slot) in elements.iter().enumerate() {
            let _ = writeln!(out, "  [{index}] {}", slot.as_deref().unwrap_or("(nil)"));
        }
    }
    if let Some(pairs) = &report.pairs {
        for (field, value) in pairs {
            let _ = writeln!(out, "  {field} = {value}");
        }
    }
    if let Some(token) = &report.token {
        let _ = writeln!(out, "  {token}");
    }
    if !report.decoded && report.error.is_none() {
        out.push_str("(undecodable)\n");
    }
    out
}

fn read_frame(input: &Path) -> io::Result<Vec<u8>> {
    if input == Path::new("-") {
        let mut frame = Vec::new();
        io::stdin().read_to_end(&mut frame)?;
        Ok(frame)
    } else {
        fs::read(input)
    }
}

fn has_odd_length(frame: &[u8]) -> bool {
    RespReader::new(frame)
        .read_unsigned_array_length()
        .is_ok_and(|count| count % 2 == 1)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
