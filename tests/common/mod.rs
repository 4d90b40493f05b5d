// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

use hickory_client::op::{Message, MessageType, OpCode, ResponseCode};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A DNS-over-TCP server answering each request with a scripted response code.
///
/// The server handles one request per scripted code, then stops. Raw request
/// messages are returned by [`FakeDnsServer::requests`].
pub struct FakeDnsServer {
    pub addr: SocketAddr,
    handle: JoinHandle<Vec<Vec<u8>>>,
}

impl FakeDnsServer {
    pub fn spawn(responses: Vec<ResponseCode>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for code in responses {
                let (mut stream, _) = listener.accept().unwrap();
                stream
                    .set_read_timeout(Some(Duration::from_secs(5)))
                    .unwrap();
                let request = read_message(&mut stream);
                write_message(&mut stream, &response_to(&request, code));
                requests.push(request);
            }
            requests
        });

        Self { addr, handle }
    }

    /// Wait for the server to finish and return the raw requests it received.
    pub fn requests(self) -> Vec<Vec<u8>> {
        self.handle.join().unwrap()
    }
}

fn read_message(stream: &mut TcpStream) -> Vec<u8> {
    let mut len = [0u8; 2];
    stream.read_exact(&mut len).unwrap();
    let mut buf = vec![0u8; usize::from(u16::from_be_bytes(len))];
    stream.read_exact(&mut buf).unwrap();
    buf
}

fn write_message(stream: &mut TcpStream, message: &[u8]) {
    let len = u16::try_from(message.len()).unwrap().to_be_bytes();
    stream.write_all(&len).unwrap();
    stream.write_all(message).unwrap();
    stream.flush().unwrap();
}

fn response_to(request: &[u8], code: ResponseCode) -> Vec<u8> {
    let request = Message::from_vec(request).unwrap();
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Update)
        .set_response_code(code);
    response.add_queries(request.queries().to_vec());
    response.to_vec().unwrap()
}

/// Returns true if `haystack` contains `needle` as a contiguous byte sequence.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
