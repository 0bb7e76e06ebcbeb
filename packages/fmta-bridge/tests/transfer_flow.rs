//! Transfer Flow Integration Test
//!
//! Drives the public API end to end: build a transfer intent, encode it,
//! sign it in process, and check what the destination side would decode.

use alloy::primitives::Address;
use fmta_bridge::{
    decode, sign_transfer, BridgeError, LocalSigner, NetworkId, PrivateKey, TransferCodec,
    TransferIntent, TransferPayload, PAYLOAD_LEN,
};
use tokio_test::{assert_err, assert_ok};

// Well-known anvil account 0
const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn sender() -> Address {
    SENDER.parse().unwrap()
}

#[tokio::test]
async fn test_encode_sign_decode() {
    let intent = TransferIntent::new(sender(), 1, 56, 2, "250.75");
    let codec = TransferCodec::default();

    let payload = codec.encode(&intent).unwrap();
    let signed = sign_transfer(&codec, &payload, &PrivateKey::new(KEY), &LocalSigner::new())
        .await
        .unwrap();

    assert_eq!(signed.signature.len(), 65);
    assert_eq!(signed.aux["signer"], SENDER);

    // What the destination receives is the hex `data` field
    let json = serde_json::to_value(&signed).unwrap();
    let data = json["data"].as_str().unwrap();
    assert_eq!(data.len(), 2 + PAYLOAD_LEN * 2);

    let received = assert_ok!(TransferPayload::from_hex(data));
    let decoded = assert_ok!(decode(&received));
    assert_eq!(decoded.sender, sender());
    assert_eq!(decoded.source_network, NetworkId(1));
    assert_eq!(decoded.destination_network, NetworkId(56));
    assert_eq!(decoded.token, 2);
    assert_eq!(decoded.amount, "250.75");

    // The key never ends up in the record
    assert!(!json.to_string().contains(&KEY[2..]));
}

#[tokio::test]
async fn test_nonces_differ_between_transfers() {
    let intent = TransferIntent::new(sender(), 1, 56, 0, "1");
    let a = fmta_bridge::encode(&intent).unwrap();
    let b = fmta_bridge::encode(&intent).unwrap();

    assert_ne!(a.nonce(), b.nonce());
    assert_eq!(a.amount_hex(), b.amount_hex());
    assert_eq!(a.as_bytes()[..76], b.as_bytes()[..76]);
}

#[tokio::test]
async fn test_invalid_intent_fails_before_signing() {
    let intent = TransferIntent::new(sender(), 1, 1 << 32, 0, "1");
    let err = assert_err!(fmta_bridge::encode(&intent));
    assert!(matches!(
        err,
        BridgeError::FieldOverflow {
            field: "destination_network",
            ..
        }
    ));
}
