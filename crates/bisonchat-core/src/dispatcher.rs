//! Command dispatch.
//!
//! Maps one parsed input line to directory operations and the action the
//! session worker should execute: a single reply to the issuing
//! connection, a fan-out of a plain chat message, or session termination.
//! "Not found" outcomes from directory lookups are recovered here into
//! reply strings; nothing on this path is an error to the process.

use crate::{
    command::{Command, EMPTY_REPLY, HELP, PROMPT},
    directory::Directory,
    handle::UserId,
};

/// What the session worker does after dispatching a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send this text to the issuing connection.
    Reply(String),
    /// Fan the trimmed message text out to eligible peers. The sender gets
    /// no reply on this path.
    Broadcast(String),
    /// Unregister and close the connection.
    Disconnect,
}

/// Dispatch one line of client input on behalf of `user`.
///
/// Directory reads and writes happen here, each under its own lock
/// section; the returned action carries the composed reply text so the
/// caller only performs I/O.
pub fn dispatch(directory: &Directory, user: UserId, line: &str) -> SessionAction {
    match Command::parse(line) {
        Command::Login(name) => {
            directory.rename(user, name);
            SessionAction::Reply(format!("Logged in as '{name}'\nchat>"))
        },
        Command::Create(room) => {
            directory.create_room(room);
            SessionAction::Reply(format!("Room '{room}' created\nchat>"))
        },
        Command::Join(room) => {
            directory.join_room(user, room);
            SessionAction::Reply(format!("Joined room '{room}'\nchat>"))
        },
        Command::Leave(room) => {
            if directory.leave_room(user, room) {
                SessionAction::Reply(format!("Left room '{room}'\nchat>"))
            } else {
                SessionAction::Reply(format!("Not a member of room '{room}'\nchat>"))
            }
        },
        Command::Connect(name) => match directory.find_by_name(name) {
            Some(peer) => {
                directory.connect_dm(user, peer);
                SessionAction::Reply(format!("Connected to user '{name}'\nchat>"))
            },
            None => SessionAction::Reply(format!("User '{name}' not found\nchat>")),
        },
        Command::Disconnect(name) => match directory.find_by_name(name) {
            Some(peer) => {
                directory.disconnect_dm(user, peer);
                SessionAction::Reply(format!("Disconnected from user '{name}'\nchat>"))
            },
            None => SessionAction::Reply(format!("User '{name}' not found\nchat>")),
        },
        Command::Rooms => {
            let mut out = String::new();
            for room in directory.list_rooms() {
                out.push_str(&room);
                out.push('\n');
            }
            out.push_str(PROMPT);
            SessionAction::Reply(out)
        },
        Command::Users => {
            let mut out = String::new();
            for (name, id) in directory.list_users() {
                out.push_str(&format!("{name} (handle {id})\n"));
            }
            out.push_str(PROMPT);
            SessionAction::Reply(out)
        },
        Command::Help => SessionAction::Reply(HELP.to_string()),
        Command::Exit => SessionAction::Disconnect,
        Command::Message(text) => SessionAction::Broadcast(text.to_string()),
        Command::Empty | Command::Incomplete => SessionAction::Reply(EMPTY_REPLY.to_string()),
    }
}
