use crate::error::PoolError;
use crate::models::beanstalk_options::BeanstalkOptions;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Largest `stats` body accepted from the server.
pub const MAX_BODY: usize = 1024 * 1024;

/// Server statistics as returned by the `stats` command.
pub type Stats = BTreeMap<String, serde_yaml::Value>;

/// A single beanstalkd connection speaking the text protocol.
pub struct Client {
    stream: BufReader<TcpStream>,
    io_timeout: Duration,
}

impl Client {
    pub async fn connect(options: &BeanstalkOptions) -> Result<Self, PoolError> {
        let stream = timeout(options.connect_timeout(), TcpStream::connect(options.addr.as_str()))
            .await?
            .map_err(|e| PoolError::Connection(format!("{}: {}", options.addr, e)))?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: BufReader::new(stream),
            io_timeout: options.io_timeout(),
        })
    }

    /// Sends `stats` and parses the YAML body of the `OK <bytes>` reply.
    pub async fn stats(&mut self) -> Result<Stats, PoolError> {
        timeout(self.io_timeout, self.exchange_stats()).await?
    }

    /// Sends `quit`; the server closes the connection.
    pub async fn quit(mut self) -> Result<(), PoolError> {
        timeout(self.io_timeout, self.stream.get_mut().write_all(b"quit\r\n")).await??;
        Ok(())
    }

    async fn exchange_stats(&mut self) -> Result<Stats, PoolError> {
        self.stream.get_mut().write_all(b"stats\r\n").await?;

        let mut line = String::new();
        if self.stream.read_line(&mut line).await? == 0 {
            return Err(PoolError::Connection("connection closed by server".into()));
        }
        let len = parse_ok_line(&line)?;

        // body followed by a trailing \r\n
        let mut body = vec![0u8; len.checked_add(2).ok_or_else(|| body_too_large(len))?];
        self.stream.read_exact(&mut body).await?;
        if !body.ends_with(b"\r\n") {
            return Err(PoolError::Protocol("stats body not terminated by CRLF".into()));
        }
        body.truncate(len);

        let stats: Option<Stats> = serde_yaml::from_slice(&body)?;
        Ok(stats.unwrap_or_default())
    }
}

fn parse_ok_line(line: &str) -> Result<usize, PoolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.split_once(' ') {
        Some(("OK", len)) => {
            let len: usize = len
                .parse()
                .map_err(|_| PoolError::Protocol(format!("bad body length in reply: {line}")))?;
            if len > MAX_BODY {
                return Err(body_too_large(len));
            }
            Ok(len)
        }
        _ => Err(PoolError::Protocol(format!("unexpected reply: {line}"))),
    }
}

fn body_too_large(len: usize) -> PoolError {
    PoolError::Protocol(format!("stats body of {len} bytes exceeds {MAX_BODY}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const BODY: &str = "---\ncurrent-jobs-ready: 0\nversion: \"1.13\"\ntotal-connections: 3\n";

    /// Answers every `stats` with `reply` until the peer hangs up.
    async fn serve(reply: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut socket = BufReader::new(socket);
            let mut line = String::new();
            while socket.read_line(&mut line).await.unwrap_or(0) > 0 {
                if line == "stats\r\n" {
                    socket.get_mut().write_all(reply.as_bytes()).await.unwrap();
                }
                line.clear();
            }
        });
        addr
    }

    #[test]
    fn test_parse_ok_line() {
        assert_eq!(parse_ok_line("OK 42\r\n").unwrap(), 42);
        assert!(matches!(parse_ok_line("OUT_OF_MEMORY\r\n"), Err(PoolError::Protocol(_))));
        assert!(matches!(parse_ok_line("OK x\r\n"), Err(PoolError::Protocol(_))));
        assert_eq!(parse_ok_line(&format!("OK {MAX_BODY}\r\n")).unwrap(), MAX_BODY);
    }

    #[tokio::test]
    async fn test_stats_oversized_length() {
        for reply in ["OK 18446744073709551615\r\n", "OK 1099511627776\r\n"] {
            let addr = serve(reply.to_string()).await;
            let mut client = Client::connect(&BeanstalkOptions::new(addr)).await.unwrap();
            assert!(matches!(client.stats().await, Err(PoolError::Protocol(_))));
        }
    }

    #[tokio::test]
    async fn test_stats() {
        let addr = serve(format!("OK {}\r\n{}\r\n", BODY.len(), BODY)).await;
        let mut client = Client::connect(&BeanstalkOptions::new(addr)).await.unwrap();

        let stats = client.stats().await.unwrap();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats["total-connections"].as_u64(), Some(3));

        // the connection stays usable
        assert_eq!(client.stats().await.unwrap().len(), 3);
        client.quit().await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_error_reply() {
        let addr = serve("INTERNAL_ERROR\r\n".to_string()).await;
        let mut client = Client::connect(&BeanstalkOptions::new(addr)).await.unwrap();
        assert!(matches!(client.stats().await, Err(PoolError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        assert!(Client::connect(&BeanstalkOptions::new(addr)).await.is_err());
    }
}
