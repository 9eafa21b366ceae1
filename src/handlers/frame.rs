//! Wire grammar for client → server frames and the server's fixed lines.
//!
//! ```text
//! LOGIN:<name>           join the default room as <name>
//! LOGIN:<name>:<room>    join <room> as <name>
//! <anything else>        chat text (active state only)
//! ```

/// Prompt sent as soon as a connection is accepted.
pub const LOGIN_PROMPT: &str = "Введите ваш логин:";

/// Key of the only frame understood before login.
pub const LOGIN_KEY: &str = "LOGIN";

/// Prefix of the sender's local echo.
pub const ECHO_PREFIX: &str = "Вы";

/// Prefix of server announcements.
pub const SERVER_PREFIX: &str = "Server";

/// A parsed `LOGIN:` frame.
///
/// `name` is trimmed but may be empty; rejecting it is the state machine's
/// call, not the parser's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest<'a> {
    pub name: &'a str,
    pub room: Option<&'a str>,
}

/// Parse a login frame.
///
/// Returns `None` for anything that does not start with `LOGIN:`; such frames
/// are ignored while awaiting login.
pub fn parse_login(frame: &str) -> Option<LoginRequest<'_>> {
    let (key, value) = frame.split_once(':')?;
    if key != LOGIN_KEY {
        return None;
    }

    let (name, room) = match value.split_once(':') {
        Some((name, room)) => (name, Some(room.trim()).filter(|r| !r.is_empty())),
        None => (value, None),
    };

    Some(LoginRequest {
        name: name.trim(),
        room,
    })
}

/// `<name>: <text>` as seen by peers.
pub fn chat_line(name: &str, text: &str) -> String {
    format!("{name}: {text}")
}

/// `Вы: <text>` as seen by the sender.
pub fn echo_line(text: &str) -> String {
    format!("{ECHO_PREFIX}: {text}")
}

/// `<name> подключился`, the body of a join announcement.
pub fn joined_text(name: &str) -> String {
    format!("{name} подключился")
}

/// `<name> покинул чат`, the body of a departure announcement.
pub fn left_text(name: &str) -> String {
    format!("{name} покинул чат")
}

/// `Server: <text>`.
pub fn server_line(text: &str) -> String {
    format!("{SERVER_PREFIX}: {text}")
}
