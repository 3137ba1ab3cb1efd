//! Wire protocol for the controller's TCP surface.
//!
//! Requests are a single `COMMAND;VALUE` text message, replies are plain
//! text. There is no framing beyond the first `;`: one read, one reply,
//! one connection.

/// Acknowledgment for a `TEMP` update.
pub const TEMP_ACK: &str = "Temperature value received!";

/// Reply for anything that is not a known command.
pub const UNKNOWN_REPLY: &str = "cannot compute, unknown command!";

/// A decoded peer request.
///
/// Numeric values are parsed at decode time; an unparsable decimal
/// silently becomes `0.0` rather than surfacing an error to the peer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request {
    /// `SET;<float>` — new target temperature.
    Set(f32),
    /// `TEMP;<float>` — new current temperature from the sensor.
    Temp(f32),
    /// `LOG;<ignored>` — snapshot query.
    Log,
    /// Anything else.
    Unknown,
}

impl Request {
    /// Decodes a raw request buffer.
    ///
    /// The buffer is split once on the first `;`; a request without one
    /// yields the whole buffer as the command and an empty value.
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let (command, value) = match text.split_once(';') {
            Some((command, value)) => (command, value),
            None => (text.as_ref(), ""),
        };

        match command {
            "SET" => Request::Set(parse_decimal(value)),
            "TEMP" => Request::Temp(parse_decimal(value)),
            "LOG" => Request::Log,
            _ => Request::Unknown,
        }
    }
}

fn parse_decimal(value: &str) -> f32 {
    value.trim().parse().unwrap_or(0.0)
}

/// Renders the `SET` reply from the `target - current` difference.
pub fn set_reply(diff: f32) -> String {
    if diff > 0.0 {
        format!("Temperature is set! I have to INCREASE the box temp of {diff:.1} degrees")
    } else {
        format!(
            "Temperature is set! I have to DECREASE the box temp of {:.1} degrees",
            -diff
        )
    }
}

/// Renders the `LOG` reply: `target;current;lamps;fan`.
pub fn log_reply(target: f32, current: f32, lamps: u8, fan: u8) -> String {
    format!("{target:.1};{current:.1};{lamps};{fan}")
}
