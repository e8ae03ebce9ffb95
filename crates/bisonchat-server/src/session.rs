//! Per-connection session worker.
//!
//! Each accepted connection runs one worker task and one writer task. The
//! worker sends the greeting, registers a guest user, then loops: read a
//! line, dispatch it, execute the resulting action. The writer task drains
//! the connection's outbound queue so fan-out from other sessions never
//! blocks on this peer's socket.
//!
//! Every terminal transition funnels into the same cleanup: an exit
//! command, end-of-stream, a read error, and a forced close during
//! shutdown all break the loop, unregister the user (a no-op if the
//! shutdown coordinator already cleared it) and close the connection.

use std::sync::Arc;

use bisonchat_core::{ClientHandle, Directory, MOTD, Outbound, SessionAction, dispatch};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc::UnboundedReceiver,
};

/// Serve one connection until its terminal state.
pub(crate) async fn run_session(stream: TcpStream, conn_id: u64, directory: Arc<Directory>) {
    let (read_half, write_half) = stream.into_split();
    let (handle, outbound) = ClientHandle::new(conn_id);
    let _writer = tokio::spawn(drain_outbound(conn_id, write_half, outbound));

    handle.send(MOTD);
    let user = directory.register(handle.clone(), format!("guest{conn_id}"));

    read_loop(read_half, user, &handle, &directory).await;

    directory.unregister(user);
    handle.close();
    tracing::debug!(conn_id, "session ended");
}

/// The read-dispatch-reply loop. Returns on any terminal transition.
async fn read_loop(
    read_half: OwnedReadHalf,
    user: u64,
    handle: &ClientHandle,
    directory: &Directory,
) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match dispatch(directory, user, &line) {
                SessionAction::Reply(text) => {
                    handle.send(text);
                },
                SessionAction::Broadcast(text) => {
                    let delivered = directory.broadcast(user, &text);
                    tracing::debug!(user, delivered, "message fanned out");
                },
                SessionAction::Disconnect => return,
            },
            // End-of-stream and read errors are both normal disconnects;
            // the latter is what a forced close during shutdown looks
            // like from here.
            Ok(None) => return,
            Err(error) => {
                tracing::debug!(user, %error, "read failed, treating as disconnect");
                return;
            },
        }
    }
}

/// Drain one connection's outbound queue into its socket.
///
/// Exits on a close marker or a failed write; either way the write half
/// shuts down, which is what lets a peer blocked on us observe the end of
/// the conversation.
async fn drain_outbound(
    conn_id: u64,
    mut write_half: OwnedWriteHalf,
    mut outbound: UnboundedReceiver<Outbound>,
) {
    while let Some(message) = outbound.recv().await {
        match message {
            Outbound::Text(text) => {
                if let Err(error) = write_half.write_all(text.as_bytes()).await {
                    tracing::warn!(conn_id, %error, "outbound write failed");
                    break;
                }
            },
            Outbound::Close => break,
        }
    }
    let _ = write_half.shutdown().await;
}
