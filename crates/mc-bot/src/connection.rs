//! Length-prefixed, optionally compressed packet framing.

use std::io::{Cursor, Read as _};

use bytes::{Buf as _, BytesMut};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use mc_protocol::{read_varint, write_varint};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Frames larger than this are rejected instead of allocated. Its length
/// prefix fits in three VarInt bytes.
const MAX_FRAME_LEN: usize = 2 * 1024 * 1024;
const MAX_HEADER_LEN: usize = 3;

pub struct Connection {
    stream: TcpStream,
    buffer: BytesMut,
    compression_threshold: Option<i32>,
}

/// Length of the next frame and the size of its prefix, once the prefix is
/// complete.
fn frame_header(buf: &[u8]) -> eyre::Result<Option<(usize, usize)>> {
    let mut length = 0usize;
    for (i, byte) in buf.iter().take(MAX_HEADER_LEN).enumerate() {
        length |= usize::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some((length, i + 1)));
        }
    }
    if buf.len() >= MAX_HEADER_LEN {
        eyre::bail!("frame length prefix longer than {MAX_HEADER_LEN} bytes");
    }
    Ok(None)
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(64 * 1024),
            compression_threshold: None,
        }
    }

    pub fn set_compression(&mut self, threshold: i32) {
        self.compression_threshold = (threshold >= 0).then_some(threshold);
    }

    /// Split the next complete frame off the read buffer.
    fn take_frame(&mut self) -> eyre::Result<Option<BytesMut>> {
        let Some((length, header)) = frame_header(&self.buffer)? else {
            return Ok(None);
        };
        if length > MAX_FRAME_LEN {
            eyre::bail!("frame of {length} bytes exceeds {MAX_FRAME_LEN}");
        }
        if self.buffer.len() < header + length {
            self.buffer.reserve(header + length - self.buffer.len());
            return Ok(None);
        }

        self.buffer.advance(header);
        Ok(Some(self.buffer.split_to(length)))
    }

    fn decode_frame(&self, frame: &[u8]) -> eyre::Result<(i32, Vec<u8>)> {
        let decompressed;
        let payload = if self.compression_threshold.is_some() {
            let mut cursor = Cursor::new(frame);
            let data_length = read_varint(&mut cursor)?;
            let rest = &frame[cursor.position() as usize..];

            if data_length == 0 {
                rest
            } else {
                let data_length = usize::try_from(data_length)?;
                if data_length > MAX_FRAME_LEN * 4 {
                    eyre::bail!("decompressed size {data_length} too large");
                }
                let mut buf = Vec::with_capacity(data_length);
                ZlibDecoder::new(rest)
                    .take(data_length as u64 + 1)
                    .read_to_end(&mut buf)?;
                if buf.len() != data_length {
                    eyre::bail!(
                        "frame declared {data_length} bytes but inflated to a different size"
                    );
                }
                decompressed = buf;
                &decompressed
            }
        } else {
            frame
        };

        let mut cursor = Cursor::new(payload);
        let packet_id = read_varint(&mut cursor)?;
        Ok((packet_id, payload[cursor.position() as usize..].to_vec()))
    }

    /// Read one packet. Returns `None` once the server closes the connection.
    ///
    /// Cancel safe: partial frames stay buffered until the next call.
    pub async fn read_packet(&mut self) -> eyre::Result<Option<(i32, Vec<u8>)>> {
        loop {
            if let Some(frame) = self.take_frame()? {
                if frame.is_empty() {
                    continue;
                }
                return self.decode_frame(&frame).map(Some);
            }

            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                if !self.buffer.is_empty() {
                    eyre::bail!("connection closed mid-frame");
                }
                return Ok(None);
            }
        }
    }

    pub async fn send_packet(&mut self, packet_id: i32, data: &[u8]) -> eyre::Result<()> {
        let mut uncompressed = Vec::with_capacity(data.len() + 5);
        write_varint(&mut uncompressed, packet_id)?;
        uncompressed.extend_from_slice(data);

        let mut frame = Vec::with_capacity(uncompressed.len() + 10);
        match self.compression_threshold {
            Some(threshold) if uncompressed.len() >= threshold as usize => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                std::io::Write::write_all(&mut encoder, &uncompressed)?;
                let compressed = encoder.finish()?;

                let mut data_length = Vec::new();
                write_varint(&mut data_length, uncompressed.len() as i32)?;

                write_varint(&mut frame, (data_length.len() + compressed.len()) as i32)?;
                frame.extend_from_slice(&data_length);
                frame.extend_from_slice(&compressed);
            }
            Some(_) => {
                // Below the threshold: data length 0, then the raw packet.
                write_varint(&mut frame, (1 + uncompressed.len()) as i32)?;
                frame.push(0);
                frame.extend_from_slice(&uncompressed);
            }
            None => {
                write_varint(&mut frame, uncompressed.len() as i32)?;
                frame.extend_from_slice(&uncompressed);
            }
        }

        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn header_needs_complete_prefix() {
        assert_eq!(frame_header(&[]).unwrap(), None);
        assert_eq!(frame_header(&[0x80]).unwrap(), None);
        assert_eq!(frame_header(&[0x05, 1, 2]).unwrap(), Some((5, 1)));
        assert_eq!(frame_header(&[0xAC, 0x02]).unwrap(), Some((300, 2)));
        assert!(frame_header(&[0xFF, 0xFF, 0xFF]).is_err());
    }

    async fn pair() -> (Connection, Connection) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, server) = tokio::join!(TcpStream::connect(addr), listener.accept());
        (
            Connection::new(client.unwrap()),
            Connection::new(server.unwrap().0),
        )
    }

    #[tokio::test]
    async fn packets_survive_compression() {
        let (mut client, mut server) = pair().await;
        client.set_compression(64);
        server.set_compression(64);

        let small = vec![7u8; 10];
        let large = vec![42u8; 1000];
        client.send_packet(0x1B, &small).await.unwrap();
        client.send_packet(0x3F, &large).await.unwrap();

        assert_eq!(server.read_packet().await.unwrap(), Some((0x1B, small)));
        assert_eq!(server.read_packet().await.unwrap(), Some((0x3F, large)));
    }

    /// Compressed frame whose header claims `claimed` bytes.
    fn compressed_frame(payload: &[u8], claimed: i32) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        std::io::Write::write_all(&mut encoder, payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut data_length = Vec::new();
        write_varint(&mut data_length, claimed).unwrap();

        let mut frame = Vec::new();
        write_varint(&mut frame, (data_length.len() + compressed.len()) as i32).unwrap();
        frame.extend_from_slice(&data_length);
        frame.extend_from_slice(&compressed);
        frame
    }

    #[tokio::test]
    async fn inflation_is_capped_at_declared_length() {
        let (mut client, mut server) = pair().await;
        server.set_compression(64);

        let mut payload = vec![1u8];
        payload.resize(1 << 20, 0);
        client
            .stream
            .write_all(&compressed_frame(&payload, 100))
            .await
            .unwrap();

        let err = server.read_packet().await.unwrap_err();
        assert!(err.to_string().contains("declared 100 bytes"), "{err}");
    }

    #[tokio::test]
    async fn short_inflation_is_rejected() {
        let (mut client, mut server) = pair().await;
        server.set_compression(64);

        client
            .stream
            .write_all(&compressed_frame(&[1u8; 80], 200))
            .await
            .unwrap();

        assert!(server.read_packet().await.is_err());
    }

    #[tokio::test]
    async fn closed_connection_reads_none() {
        let (client, mut server) = pair().await;
        drop(client);
        assert_eq!(server.read_packet().await.unwrap(), None);
    }
}
