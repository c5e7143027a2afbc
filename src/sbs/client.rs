use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Connect to a BaseStation feed and forward every newline-delimited record
/// to `lines` until the peer closes the stream or the receiver is dropped.
///
/// There is no reconnect policy here: on EOF or a read error the task logs
/// and returns, and the ingestion channel closes with it.
pub async fn run_feed(host: &str, port: u16, lines: mpsc::Sender<String>) -> std::io::Result<()> {
    let stream = TcpStream::connect((host, port)).await?;
    log::info!("Connected to SBS feed at {}:{}", host, port);

    let mut reader = BufReader::new(stream).lines();
    while let Some(line) = reader.next_line().await? {
        if lines.send(line).await.is_err() {
            // Ingestion ended first; nothing left to feed.
            break;
        }
    }

    log::warn!("SBS feed {}:{} closed", host, port);
    Ok(())
}
