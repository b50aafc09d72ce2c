use super::senders::send_recv_as;
use crate::communication::KrbChannel;
use crate::core::forge::{build_as_req, extract_ticket_from_as_rep};
use crate::core::{Cipher, KrbUser, TicketCred};
use crate::error::Result;
use kerberos_crypto::Key;
use log::debug;

/// Uses user credentials to request a TGT
pub fn request_tgt(
    user: KrbUser,
    user_key: &Key,
    channel: &dyn KrbChannel,
) -> Result<TicketCred> {
    let cipher = Cipher::generate(user_key, &user)?;
    debug!("Request TGT for {} with etype {}", user, cipher.etype());

    let as_req = build_as_req(user, Some(&cipher));
    let as_rep = send_recv_as(channel, &as_req)?;

    return extract_ticket_from_as_rep(as_rep, &cipher);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::TransportProtocol;
    use crate::error::Error;
    use kerberos_asn1::{Asn1Object, AsReq, KrbError};
    use kerberos_constants::error_codes;
    use std::cell::RefCell;
    use std::io;
    use std::net::{IpAddr, Ipv4Addr};

    struct FakeChannel {
        response: Vec<u8>,
        requests: RefCell<Vec<Vec<u8>>>,
    }

    impl KrbChannel for FakeChannel {
        fn send_recv(&self, raw: &[u8]) -> io::Result<Vec<u8>> {
            self.requests.borrow_mut().push(raw.to_vec());
            return Ok(self.response.clone());
        }

        fn protocol(&self) -> TransportProtocol {
            return TransportProtocol::TCP;
        }

        fn ip(&self) -> IpAddr {
            return IpAddr::V4(Ipv4Addr::LOCALHOST);
        }
    }

    #[test]
    fn test_kdc_error_is_returned() {
        let mut krb_error = KrbError::default();
        krb_error.error_code = error_codes::KDC_ERR_C_PRINCIPAL_UNKNOWN;
        let channel = FakeChannel {
            response: krb_error.build(),
            requests: RefCell::new(Vec::new()),
        };

        let user = KrbUser::new("hdfs/node1".into(), "EXAMPLE.COM".into());
        let err =
            request_tgt(user, &Key::AES256Key([1; 32]), &channel).unwrap_err();

        match err {
            Error::KrbError(krb_error) => assert_eq!(
                error_codes::KDC_ERR_C_PRINCIPAL_UNKNOWN,
                krb_error.error_code
            ),
            other => panic!("unexpected error {}", other),
        }

        let requests = channel.requests.borrow();
        assert_eq!(1, requests.len());
        let (_, as_req) = AsReq::parse(&requests[0]).unwrap();
        assert_eq!(
            vec!["hdfs".to_string(), "node1".to_string()],
            as_req.req_body.cname.as_ref().unwrap().name_string
        );
        assert_eq!(
            vec![kerberos_constants::etypes::AES256_CTS_HMAC_SHA1_96],
            as_req.req_body.etypes
        );
    }

    #[test]
    fn test_unknown_response() {
        let channel = FakeChannel {
            response: vec![0, 1, 2, 3],
            requests: RefCell::new(Vec::new()),
        };
        let user = KrbUser::new("hdfs".into(), "EXAMPLE.COM".into());
        let err = request_tgt(user, &Key::RC4Key([1; 16]), &channel).unwrap_err();
        assert_eq!("Error parsing response", err.to_string());
    }
}
