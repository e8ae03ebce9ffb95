//! Line protocol: tokenization and the command set.
//!
//! Clients send newline-terminated lines. The first whitespace-delimited
//! token selects a command; one following token is its argument where the
//! command takes one, and surplus tokens are ignored. A non-empty line
//! whose first token is not a command name is a plain chat message and
//! fans out to eligible peers.

/// Greeting sent once per connection, ending in the prompt marker.
pub const MOTD: &str = "Thanks for connecting to the BisonChat Server.\n\nchat>";

/// Prompt marker terminating every reply, so clients can detect turn
/// completion.
pub const PROMPT: &str = "chat>";

/// Reply for an empty line or a command missing its argument.
pub const EMPTY_REPLY: &str = "\nchat>";

/// Static command summary for `help`.
pub const HELP: &str = "login <username> - \"login with username\"\n\
create <room> - \"create a room\"\n\
join <room> - \"join a room\"\n\
leave <room> - \"leave a room\"\n\
users - \"list all users\"\n\
rooms - \"list all rooms\"\n\
connect <user> - \"connect to user\"\n\
disconnect <user> - \"disconnect from user\"\n\
exit - \"exit chat\"\nchat>";

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `login <name>`: set the display name.
    Login(&'a str),
    /// `create <room>`: idempotent room creation.
    Create(&'a str),
    /// `join <room>`: join (and create if absent) a room.
    Join(&'a str),
    /// `leave <room>`: drop room membership.
    Leave(&'a str),
    /// `connect <name>`: establish a DM-link.
    Connect(&'a str),
    /// `disconnect <name>`: sever a DM-link.
    Disconnect(&'a str),
    /// `rooms`: list room names.
    Rooms,
    /// `users`: list display names and handles.
    Users,
    /// `help`: static command summary.
    Help,
    /// `exit` or `logout`: terminate the session.
    Exit,
    /// Anything else non-empty: a chat message (trimmed) to fan out.
    Message(&'a str),
    /// Blank input.
    Empty,
    /// A command name without its required argument. Treated as a no-op.
    Incomplete,
}

impl<'a> Command<'a> {
    /// Tokenize one line of client input.
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        let mut tokens = trimmed.split_whitespace();
        let Some(head) = tokens.next() else {
            return Self::Empty;
        };
        let arg = tokens.next();

        match head {
            "login" => arg.map_or(Self::Incomplete, Self::Login),
            "create" => arg.map_or(Self::Incomplete, Self::Create),
            "join" => arg.map_or(Self::Incomplete, Self::Join),
            "leave" => arg.map_or(Self::Incomplete, Self::Leave),
            "connect" => arg.map_or(Self::Incomplete, Self::Connect),
            "disconnect" => arg.map_or(Self::Incomplete, Self::Disconnect),
            "rooms" => Self::Rooms,
            "users" => Self::Users,
            "help" => Self::Help,
            "exit" | "logout" => Self::Exit,
            _ => Self::Message(trimmed),
        }
    }
}
