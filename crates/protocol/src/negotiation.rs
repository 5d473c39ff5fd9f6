//! Protocol version agreement and per-session checksum negotiation.

use crate::checksum::ChecksumKind;
use crate::error::NegotiationError;
use crate::version::{ProtocolVersion, NEWEST_SUPPORTED_PROTOCOL, OLDEST_SUPPORTED_PROTOCOL};

/// Agrees on a protocol version from the two announced preferences.
///
/// The agreed version is the minimum of both announcements, capped at the
/// newest supported revision. Peers agreeing below the supported floor cannot
/// interoperate with this implementation.
///
/// # Errors
///
/// Returns [`NegotiationError::ProtocolUnsupported`] when the agreed version
/// falls below [`ProtocolVersion::OLDEST`].
pub fn negotiate_version(local: u8, remote: u8) -> Result<ProtocolVersion, NegotiationError> {
    let agreed = local.min(remote).min(NEWEST_SUPPORTED_PROTOCOL);
    if agreed < OLDEST_SUPPORTED_PROTOCOL {
        return Err(NegotiationError::ProtocolUnsupported {
            local,
            remote,
            agreed,
        });
    }

    Ok(ProtocolVersion::new(agreed).unwrap_or(ProtocolVersion::NEWEST))
}

/// Picks the strong checksum for a session from exchanged name lists.
///
/// Mirrors the checksum-name negotiation introduced alongside protocol 32:
/// the client announces its preferences in order and the first name the
/// server also supports wins. Names that do not parse or that the agreed
/// protocol version cannot use are skipped, matching the tolerance both
/// implementations show for unknown future algorithms. Sessions below the
/// negotiation cut-over keep the protocol default without consulting lists.
///
/// # Errors
///
/// Returns [`NegotiationError::NoMutualChecksum`] when no client preference
/// is usable.
pub fn negotiate_checksum(
    protocol: ProtocolVersion,
    client_names: &[&str],
    server_names: &[&str],
) -> Result<ChecksumKind, NegotiationError> {
    if protocol < ProtocolVersion::CHECKSUM_NEGOTIATION_INTRODUCED {
        return Ok(protocol.default_checksum());
    }

    for name in client_names {
        if !server_names.contains(name) {
            continue;
        }
        let Ok(kind) = name.parse::<ChecksumKind>() else {
            continue;
        };
        if kind.supported_by(protocol) {
            return Ok(kind);
        }
    }

    Err(NegotiationError::NoMutualChecksum {
        offered: client_names.iter().map(|name| (*name).to_owned()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreed_version_is_the_minimum() {
        assert_eq!(negotiate_version(31, 29).unwrap().as_u8(), 29);
        assert_eq!(negotiate_version(29, 31).unwrap().as_u8(), 29);
        assert_eq!(negotiate_version(32, 32).unwrap().as_u8(), 32);
    }

    #[test]
    fn future_versions_cap_at_the_newest_supported() {
        assert_eq!(negotiate_version(40, 40).unwrap().as_u8(), 32);
        assert_eq!(negotiate_version(40, 31).unwrap().as_u8(), 31);
    }

    #[test]
    fn ancient_peers_are_rejected() {
        let err = negotiate_version(32, 19).unwrap_err();
        assert!(matches!(
            err,
            NegotiationError::ProtocolUnsupported { agreed: 19, .. }
        ));
        assert!(negotiate_version(14, 14).is_err());
    }

    #[test]
    fn floor_version_still_negotiates() {
        assert_eq!(negotiate_version(20, 25).unwrap().as_u8(), 20);
    }

    #[test]
    fn checksum_negotiation_prefers_client_order() {
        let agreed = negotiate_checksum(
            ProtocolVersion::NEWEST,
            &["xxh128", "xxh3", "md5"],
            &["md5", "xxh3", "xxh128"],
        )
        .unwrap();
        assert_eq!(agreed, ChecksumKind::Xxh3_128);
    }

    #[test]
    fn checksum_negotiation_skips_unknown_names() {
        let agreed = negotiate_checksum(
            ProtocolVersion::NEWEST,
            &["blake9", "md5"],
            &["blake9", "md5"],
        )
        .unwrap();
        assert_eq!(agreed, ChecksumKind::Md5);
    }

    #[test]
    fn checksum_negotiation_requires_a_mutual_name() {
        let err = negotiate_checksum(ProtocolVersion::NEWEST, &["sha1"], &["md5"]).unwrap_err();
        assert!(matches!(err, NegotiationError::NoMutualChecksum { .. }));
    }

    #[test]
    fn older_protocols_keep_their_default() {
        let agreed = negotiate_checksum(
            ProtocolVersion::new(30).unwrap(),
            &["xxh128"],
            &["xxh128"],
        )
        .unwrap();
        assert_eq!(agreed, ChecksumKind::Md5);

        let agreed =
            negotiate_checksum(ProtocolVersion::new(26).unwrap(), &[], &[]).unwrap();
        assert_eq!(agreed, ChecksumKind::Md4);
    }
}
