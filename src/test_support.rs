// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Test doubles for the HTTP transport and the clock.

use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use crate::{
    client::{ApiResponse, Transport},
    error::Error,
    retry::Clock,
};

/// Transport answering from per-URL queues of canned responses.
///
/// The last response queued for a URL is repeated once the queue drains to
/// it; unscripted URLs fail with a network error.
#[derive(Debug, Default,)]
pub(crate) struct ScriptedTransport
{
    routes: Mutex<HashMap<String, VecDeque<ApiResponse,>,>,>,
    calls:  Mutex<Vec<String,>,>,
}

impl ScriptedTransport
{
    pub(crate) fn new() -> Self
    {
        Self::default()
    }

    pub(crate) fn respond(self, url: &str, response: ApiResponse,) -> Self
    {
        self.routes
            .lock()
            .expect("routes lock",)
            .entry(url.to_owned(),)
            .or_default()
            .push_back(response,);
        self
    }

    pub(crate) fn calls(&self,) -> Vec<String,>
    {
        self.calls.lock().expect("calls lock",).clone()
    }
}

impl Transport for ScriptedTransport
{
    async fn get(&self, url: &str,) -> Result<ApiResponse, Error,>
    {
        self.calls.lock().expect("calls lock",).push(url.to_owned(),);

        let mut routes = self.routes.lock().expect("routes lock",);
        let queue = routes
            .get_mut(url,)
            .ok_or_else(|| Error::network(format!("unscripted request to {url}"),),)?;
        let response = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };

        response.ok_or_else(|| Error::network(format!("no response left for {url}"),),)
    }
}

/// Clock whose time only moves when something sleeps on it.
#[derive(Debug,)]
pub(crate) struct ManualClock
{
    now:    Mutex<u64,>,
    sleeps: Mutex<Vec<Duration,>,>,
}

impl ManualClock
{
    pub(crate) fn new(now_epoch_secs: u64,) -> Self
    {
        Self {
            now: Mutex::new(now_epoch_secs,), sleeps: Mutex::new(Vec::new(),),
        }
    }

    pub(crate) fn sleeps(&self,) -> Vec<Duration,>
    {
        self.sleeps.lock().expect("sleeps lock",).clone()
    }
}

impl Clock for ManualClock
{
    fn now_epoch_secs(&self,) -> u64
    {
        *self.now.lock().expect("clock lock",)
    }

    async fn sleep(&self, duration: Duration,)
    {
        self.sleeps.lock().expect("sleeps lock",).push(duration,);
        *self.now.lock().expect("clock lock",) += duration.as_secs();
    }
}

/// Minimal listing entry for `name` as the API would return it.
pub(crate) fn repository_json(name: &str, fork: bool,) -> String
{
    format!(
        r#"{{"name":"{name}","fork":{fork},"languages_url":"https://api.github.com/repos/octocat/{name}/languages"}}"#
    )
}

/// Local HTTP/1.1 server that records every request head it receives and
/// answers each with the same JSON body.
pub(crate) struct RecordingServer
{
    address:  SocketAddr,
    requests: Arc<Mutex<Vec<String,>,>,>,
}

impl RecordingServer
{
    pub(crate) async fn start(body: &'static str,) -> Self
    {
        let listener = TcpListener::bind("127.0.0.1:0",).await.expect("bind local listener",);
        let address = listener.local_addr().expect("listener address",);
        let requests = Arc::new(Mutex::new(Vec::new(),),);

        let recorded = Arc::clone(&requests,);
        tokio::spawn(async move {
            while let Ok((stream, _,),) = listener.accept().await {
                let recorded = Arc::clone(&recorded,);
                tokio::spawn(serve_one(stream, body, recorded,),);
            }
        },);

        Self {
            address,
            requests,
        }
    }

    /// Base URL of the server with `prefix` appended.
    pub(crate) fn url(&self, prefix: &str,) -> String
    {
        format!("http://{}{prefix}", self.address)
    }

    /// Recorded request heads, request line first.
    pub(crate) fn requests(&self,) -> Vec<String,>
    {
        self.requests.lock().expect("requests lock",).clone()
    }
}

async fn serve_one(mut stream: TcpStream, body: &'static str, recorded: Arc<Mutex<Vec<String,>,>,>,)
{
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    while !head.windows(4,).any(|window| window == b"\r\n\r\n",) {
        match stream.read(&mut chunk,).await {
            Ok(0,) | Err(_,) => return,
            Ok(read,) => head.extend_from_slice(&chunk[..read],),
        }
    }
    recorded.lock().expect("requests lock",).push(String::from_utf8_lossy(&head,).into_owned(),);

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nX-RateLimit-Remaining: 4999\r\nX-RateLimit-Reset: 1700000000\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes(),).await;
    let _ = stream.shutdown().await;
}
