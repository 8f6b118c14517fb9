//! `KeyValueStore` over a persistent TCP connection to the store.
//!
//! # Design
//! One connection, guarded by an async mutex, so concurrent HTTP requests
//! serialize on it. Command lines and reply classification come from
//! `todo_core::protocol`; this module only moves lines over the socket.
//!
//! A connection that fails mid round trip (I/O error, timeout, peer closed)
//! is dropped rather than reused, since a late reply would otherwise be read
//! as the answer to the next command. The next command dials again and
//! repeats the handshake.

use std::future::Future;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use todo_core::{Command, KeyValueStore, KvError, Reply};

/// Longest reply line accepted before the connection is considered broken.
const MAX_LINE: usize = 1024 * 1024;

/// `LIN <user> <password>` credentials.
#[derive(Debug)]
pub struct Login {
    pub user: String,
    pub password: SecretString,
}

/// Handshake sent on every new connection: `LIN` first, then `AUTH`, each
/// only when configured.
#[derive(Debug, Default)]
pub struct Credentials {
    pub login: Option<Login>,
    pub auth_token: Option<SecretString>,
}

#[derive(Debug)]
struct Connection {
    stream: BufWriter<TcpStream>,
    buffer: BytesMut,
}

impl Connection {
    fn new(socket: TcpStream) -> Connection {
        Connection {
            stream: BufWriter::new(socket),
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    async fn round_trip(&mut self, line: &str) -> Result<Reply, KvError> {
        self.write_line(line).await?;
        let reply = self.read_line().await?;
        Ok(Reply::parse(&reply))
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.flush().await
    }

    async fn read_line(&mut self) -> Result<String, KvError> {
        loop {
            if let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
                let line = self.buffer.split_to(end + 1);
                return String::from_utf8(line.to_vec()).map_err(|_| {
                    KvError::UnexpectedReply("reply is not valid UTF-8".to_string())
                });
            }
            if self.buffer.len() > MAX_LINE {
                return Err(KvError::UnexpectedReply(format!(
                    "reply exceeds {MAX_LINE} bytes"
                )));
            }
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return Err(KvError::ConnectionClosed);
            }
        }
    }
}

pub struct TcpStore {
    addr: String,
    credentials: Credentials,
    timeout: Option<Duration>,
    connection: Mutex<Option<Connection>>,
}

impl TcpStore {
    /// Dial `addr` and complete the handshake. Fails if either step fails.
    pub async fn connect(
        addr: impl Into<String>,
        credentials: Credentials,
        timeout: Option<Duration>,
    ) -> Result<TcpStore, KvError> {
        let store = TcpStore {
            addr: addr.into(),
            credentials,
            timeout,
            connection: Mutex::new(None),
        };
        let connection = store.open().await?;
        *store.connection.lock().await = Some(connection);
        Ok(store)
    }

    async fn open(&self) -> Result<Connection, KvError> {
        self.with_timeout(self.dial()).await
    }

    async fn dial(&self) -> Result<Connection, KvError> {
        let socket = TcpStream::connect(self.addr.as_str()).await?;
        let mut connection = Connection::new(socket);

        if let Some(login) = &self.credentials.login {
            let command = Command::Login {
                user: &login.user,
                password: login.password.expose_secret(),
            };
            connection.round_trip(&command.encode()?).await?.into_ack()?;
        }
        if let Some(token) = &self.credentials.auth_token {
            let command = Command::Auth {
                token: token.expose_secret(),
            };
            connection.round_trip(&command.encode()?).await?.into_ack()?;
        }

        info!(addr = %self.addr, "connected to store");
        Ok(connection)
    }

    async fn execute(&self, command: Command<'_>) -> Result<Reply, KvError> {
        let line = command.encode()?;
        debug!(?command, "store round trip");

        let mut slot = self.connection.lock().await;
        let mut connection = match slot.take() {
            Some(connection) => connection,
            None => self.open().await?,
        };

        let result = self.with_timeout(connection.round_trip(&line)).await;
        match &result {
            Ok(_) => *slot = Some(connection),
            Err(err) => {
                warn!(command = command.name(), error = %err, "dropping store connection")
            }
        }
        result
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, KvError>>,
    ) -> Result<T, KvError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| KvError::Timeout(limit))?,
            None => fut.await,
        }
    }
}

#[async_trait]
impl KeyValueStore for TcpStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.execute(Command::Get { key }).await?.into_value()
    }

    async fn set(&self, key: &str, value: &str, durable: bool) -> Result<(), KvError> {
        self.execute(Command::Set {
            key,
            value,
            durable,
        })
        .await?
        .into_ack()
    }

    async fn delete(&self, key: &str, durable: bool) -> Result<(), KvError> {
        self.execute(Command::Del { key, durable }).await?.into_ack()
    }
}
