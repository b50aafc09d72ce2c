use crate::communication::{KrbChannel, TransportProtocol};
use std::io;
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::Duration;

/// Send Kerberos messages over UDP
#[derive(Debug)]
pub struct UdpChannel {
    dst_addr: SocketAddr,
}

impl UdpChannel {
    pub fn new(dst_addr: SocketAddr) -> Self {
        return Self { dst_addr };
    }
}

impl KrbChannel for UdpChannel {
    fn send_recv(&self, raw: &[u8]) -> io::Result<Vec<u8>> {
        return send_recv_udp(&self.dst_addr, raw);
    }

    fn protocol(&self) -> TransportProtocol {
        return TransportProtocol::UDP;
    }

    fn ip(&self) -> IpAddr {
        return self.dst_addr.ip();
    }
}

pub fn send_recv_udp(
    dst_addr: &SocketAddr,
    raw_request: &[u8],
) -> io::Result<Vec<u8>> {
    let bind_addr = if dst_addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let udp_socket = UdpSocket::bind(bind_addr)?;
    udp_socket.set_read_timeout(Some(Duration::new(10, 0)))?;
    udp_socket.connect(dst_addr)?;

    udp_socket.send(raw_request)?;

    let data_length = calculate_response_size(&udp_socket)?;

    let mut raw_response = vec![0; data_length as usize];
    udp_socket.recv(&mut raw_response)?;

    return Ok(raw_response);
}

fn calculate_response_size(udp_socket: &UdpSocket) -> io::Result<usize> {
    let mut raw_response = vec![0; 2048];
    let mut data_length = udp_socket.peek(&mut raw_response)?;
    while data_length == raw_response.len() {
        raw_response.append(&mut raw_response.clone());
        data_length = udp_socket.peek(&mut raw_response)?;
    }
    return Ok(data_length);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_send_recv() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = server.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (size, src) = server.recv_from(&mut buf).unwrap();
            let response: Vec<u8> = buf[..size].iter().map(|b| b + 1).collect();
            server.send_to(&response, src).unwrap();
        });

        let channel = UdpChannel::new(addr);
        let response = channel.send_recv(&[1, 2, 3]).unwrap();
        handle.join().unwrap();

        assert_eq!(vec![2, 3, 4], response);
        assert_eq!(TransportProtocol::UDP, channel.protocol());
    }
}
