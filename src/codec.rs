//! Length-prefixed bincode framing shared by both ends of a connection.
//!
//! Every frame is a big-endian `u32` length followed by the bincode encoding
//! of `(RequestId, message)`. The `RequestId` is the multiplex slot owned by
//! `tokio-proto`, not the application `req_id`.

use std::io;
use std::marker::PhantomData;

use bytes::{Buf, BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_codec::{Decoder, Encoder};
use tokio_proto::multiplex::RequestId;

const HEADER_LEN: usize = 4;

/// Largest frame body accepted from a peer.
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// Decodes `In` frames and encodes `Out` frames.
pub struct FrameCodec<In, Out> {
    _messages: PhantomData<fn(Out) -> In>,
}

impl<In, Out> FrameCodec<In, Out> {
    pub fn new() -> Self {
        FrameCodec {
            _messages: PhantomData,
        }
    }
}

impl<In, Out> Default for FrameCodec<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: DeserializeOwned, Out> Decoder for FrameCodec<In, Out> {
    type Item = (RequestId, In);
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, io::Error> {
        if buf.len() < HEADER_LEN {
            return Ok(None);
        }
        let length = io::Cursor::new(&buf[..HEADER_LEN]).get_u32_be() as usize;
        if length > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame of {} bytes exceeds {}", length, MAX_FRAME_LEN),
            ));
        }
        if buf.len() < HEADER_LEN + length {
            buf.reserve(HEADER_LEN + length - buf.len());
            return Ok(None);
        }

        buf.split_to(HEADER_LEN);
        let body = buf.split_to(length);
        bincode::deserialize(&body)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

impl<In, Out: Serialize> Encoder for FrameCodec<In, Out> {
    type Item = (RequestId, Out);
    type Error = io::Error;

    fn encode(&mut self, item: Self::Item, buf: &mut BytesMut) -> io::Result<()> {
        let bytes = bincode::serialize(&item, bincode::Infinite)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        let length = bytes.len();
        buf.reserve(HEADER_LEN + length);
        buf.put_u32_be(length as u32);
        buf.put_slice(&bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Reply, Request};

    #[test]
    fn waits_for_a_complete_frame() {
        let mut client = FrameCodec::<Reply, Request>::new();
        let mut server = FrameCodec::<Request, Reply>::new();
        let mut wire = BytesMut::new();
        client
            .encode((3, Request::Echo { req_id: 11 }), &mut wire)
            .unwrap();

        let mut partial = BytesMut::new();
        partial.extend_from_slice(&wire[..wire.len() - 1]);
        assert!(server.decode(&mut partial).unwrap().is_none());
        assert_eq!(partial.len(), wire.len() - 1);

        partial.extend_from_slice(&wire[wire.len() - 1..]);
        let (id, request) = server.decode(&mut partial).unwrap().unwrap();
        assert_eq!(id, 3);
        assert_eq!(request, Request::Echo { req_id: 11 });
        assert!(partial.is_empty());
    }

    #[test]
    fn decodes_back_to_back_frames() {
        let mut server = FrameCodec::<Request, Reply>::new();
        let mut client = FrameCodec::<Reply, Request>::new();
        let mut wire = BytesMut::new();
        server
            .encode((1, Reply { req_id: 5, timestamp: 10 }), &mut wire)
            .unwrap();
        server
            .encode((2, Reply { req_id: 6, timestamp: 20 }), &mut wire)
            .unwrap();

        assert_eq!(
            client.decode(&mut wire).unwrap(),
            Some((1, Reply { req_id: 5, timestamp: 10 }))
        );
        assert_eq!(
            client.decode(&mut wire).unwrap(),
            Some((2, Reply { req_id: 6, timestamp: 20 }))
        );
        assert_eq!(client.decode(&mut wire).unwrap(), None);
    }

    #[test]
    fn rejects_oversized_frame() {
        let mut codec = FrameCodec::<Request, Reply>::new();
        let mut buf = BytesMut::with_capacity(HEADER_LEN);
        buf.put_u32_be((MAX_FRAME_LEN + 1) as u32);
        let err = codec.decode(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
