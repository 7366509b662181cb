pub const GREETING_TOPIC: &str = "hello/greeting";

/// Maps a CONNACK return code onto its MQTT 3.1.1 numeric value.
pub fn return_code(code: rumqttc::ConnectReturnCode) -> u8 {
    use rumqttc::ConnectReturnCode::*;

    match code {
        Success => 0,
        RefusedProtocolVersion => 1,
        BadClientId => 2,
        ServiceUnavailable => 3,
        BadUserNamePassword => 4,
        NotAuthorized => 5,
    }
}

pub fn describe_return_code(code: u8) -> &'static str {
    match code {
        0 => "accepted",
        1 => "unacceptable protocol version",
        2 => "identifier rejected",
        3 => "server unavailable",
        4 => "bad user name or password",
        5 => "not authorized",
        _ => "unknown",
    }
}
