//! Sends one raw request to a running `sockapi-server` and prints the reply.
//!
//! ```text
//! cargo run -p sockapi-web --example api_request -- --target "/account?fname=Zakareya&lname=Alatoli"
//! ```

use std::error::Error;

use clap::Parser;
use sockapi_http::codec::parse_response;
use sockapi_http::protocol::RawFrame;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(about = "send one request to a sockapi server")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:3000")]
    address: String,

    #[arg(long, default_value = "GET")]
    method: String,

    #[arg(long, default_value = "/account?fname=Zakareya&lname=Alatoli")]
    target: String,

    /// Optional JSON body, sent with a matching `Content-Length`
    #[arg(long)]
    body: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut request = format!(
        "{} {} HTTP/1.1\r\nContent-Type: application/json\r\nAccept: application/json\r\n",
        args.method, args.target
    );
    let body = args.body.unwrap_or_default();
    if !body.is_empty() {
        request.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    request.push_str("\r\n");
    request.push_str(&body);

    let mut stream = TcpStream::connect(args.address.as_str()).await?;
    info!(address = %args.address, method = %args.method, target = %args.target, "sending request");
    stream.write_all(request.as_bytes()).await?;

    // the server closes the connection after one response
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;

    let response = parse_response(RawFrame::new(raw))?;
    info!(status = response.status(), reason = response.reason(), "received response");
    for (name, value) in response.headers().iter() {
        info!(name, value, "header");
    }
    println!("{}", String::from_utf8_lossy(response.body()));

    Ok(())
}
