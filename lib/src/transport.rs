// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Generic transport abstraction for signer communication
//!
//! A [Transport] carries one host message to the signer and returns the
//! signer's reply. [FramedTransport] implements this over any async byte
//! stream using the [frame][hwtx_proto::frame] encoding.

use async_trait::async_trait;
use encdec::DecodeOwned;
use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use hwtx_proto::{
    frame::{encode_frame, FrameHeader, HEADER_LEN},
    DeviceMessage, HostMessage,
};

/// Request / response exchange with a signer
#[async_trait]
pub trait Transport: Send {
    /// Send a message and await the signer's reply
    async fn call(&mut self, msg: HostMessage) -> anyhow::Result<DeviceMessage>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &mut T {
    async fn call(&mut self, msg: HostMessage) -> anyhow::Result<DeviceMessage> {
        (**self).call(msg).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn call(&mut self, msg: HostMessage) -> anyhow::Result<DeviceMessage> {
        (**self).call(msg).await
    }
}

/// Read a single frame, returning the message type and payload
pub async fn read_frame<S: AsyncRead + Unpin>(s: &mut S) -> anyhow::Result<(u16, Vec<u8>)> {
    let mut h = [0u8; HEADER_LEN];
    s.read_exact(&mut h).await?;

    let (header, _n) = FrameHeader::decode_owned(&h)?;

    let mut payload = vec![0u8; header.len as usize];
    s.read_exact(&mut payload).await?;

    trace!("rx frame type: {} len: {}", header.msg_type, header.len);

    Ok((header.msg_type, payload))
}

/// Write a single frame
pub async fn write_frame<S: AsyncWrite + Unpin>(
    s: &mut S,
    msg_type: u16,
    payload: &[u8],
) -> anyhow::Result<()> {
    let f = encode_frame(msg_type, payload)?;

    trace!("tx frame type: {} len: {}", msg_type, payload.len());

    s.write_all(&f).await?;
    s.flush().await?;

    Ok(())
}

/// Transport over a framed byte stream (TCP bridge, USB pipe, etc.)
pub struct FramedTransport<S> {
    stream: S,
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> FramedTransport<S> {
    /// Wrap a connected stream
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Release the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[async_trait]
impl<S: AsyncRead + AsyncWrite + Unpin + Send> Transport for FramedTransport<S> {
    async fn call(&mut self, msg: HostMessage) -> anyhow::Result<DeviceMessage> {
        let t = msg.message_type();

        write_frame(&mut self.stream, t as u16, &msg.encode_payload()).await?;

        let (msg_type, payload) = read_frame(&mut self.stream).await?;
        let resp = DeviceMessage::decode(msg_type, &payload)?;

        Ok(resp)
    }
}

/// Connect to a signer exposed over TCP (eg. an emulator bridge)
#[cfg(feature = "transport_tcp")]
pub async fn connect_tcp(
    addr: impl tokio::net::ToSocketAddrs,
) -> anyhow::Result<FramedTransport<tokio::net::TcpStream>> {
    let s = tokio::net::TcpStream::connect(addr).await?;
    s.set_nodelay(true)?;

    Ok(FramedTransport::new(s))
}
