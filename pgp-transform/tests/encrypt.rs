use pgp::{
    armor::BlockType,
    composed::{Esk, Message},
};
use pgp_transform::{armor::unarmor, compression, Decryptor, Encryptor, ErrorKind};

mod utils;
use utils::{public_entity, test_entity, PASSPHRASE};

#[test]
#[allow(clippy::missing_panics_doc)]
pub fn encrypt_hello_world_round_trip() {
    let entity = test_entity();
    let armored = Encryptor::new(&entity)
        .encrypt(b"hello world")
        .expect("Failed to encrypt");
    assert!(armored.starts_with(b"-----BEGIN PGP MESSAGE-----"));

    let plaintext = Decryptor::new(&entity)
        .decrypt(PASSPHRASE, &armored)
        .expect("Failed to decrypt");
    assert_eq!(plaintext, b"hello world");
}

#[test]
#[allow(clippy::missing_panics_doc)]
pub fn encrypt_empty_round_trip() {
    let entity = test_entity();
    let armored = Encryptor::new(&entity).encrypt(b"").expect("Failed to encrypt");
    let plaintext = Decryptor::new(&entity)
        .decrypt(PASSPHRASE, &armored)
        .expect("Failed to decrypt");
    assert!(plaintext.is_empty());
}

#[test]
#[allow(clippy::missing_panics_doc)]
pub fn encrypt_arbitrary_bytes_round_trip() {
    let entity = test_entity();
    let unlocked = entity.unlock(PASSPHRASE).expect("Failed to unlock");
    let inputs: [Vec<u8>; 3] = [
        (0..=255).collect(),
        vec![0_u8; 100_000],
        b"\x1f\x8b already looks like gzip".to_vec(),
    ];
    for input in inputs {
        let armored = Encryptor::new(&entity)
            .encrypt(&input)
            .expect("Failed to encrypt");
        let plaintext =
            pgp_transform::decrypt_unlocked(&unlocked, &armored).expect("Failed to decrypt");
        assert_eq!(plaintext, input);
    }
}

#[test]
#[allow(clippy::missing_panics_doc)]
pub fn encrypt_with_public_only_entity() {
    let entity = public_entity();
    let armored = Encryptor::new(&entity)
        .encrypt(b"hello world")
        .expect("Encryption needs no private key");

    let err = Decryptor::new(&entity)
        .decrypt(PASSPHRASE, &armored)
        .expect_err("No private key to decrypt with");
    assert_eq!(err.kind(), ErrorKind::Passphrase);
}

#[test]
#[allow(clippy::missing_panics_doc)]
pub fn encrypted_message_structure() {
    let entity = public_entity();
    let armored = Encryptor::new(&entity)
        .encrypt(b"hello world")
        .expect("Failed to encrypt");

    let binary = unarmor(&armored, BlockType::Message).expect("Failed to unarmor");
    let message = Message::from_bytes(binary.as_slice()).expect("Failed to parse message");
    let Message::Encrypted { esk, .. } = &message else {
        panic!("Expected an encrypted message");
    };
    assert_eq!(esk.len(), 1);
    let Esk::PublicKeyEncryptedSessionKey(pkesk) = &esk[0] else {
        panic!("Expected a public key encrypted session key");
    };
    assert_eq!(pkesk.id().expect("Missing key id"), &entity.key_id());
}

#[test]
#[allow(clippy::missing_panics_doc)]
pub fn fresh_session_key_per_call() {
    let entity = public_entity();
    let first = Encryptor::new(&entity).encrypt(b"same").expect("Failed to encrypt");
    let second = Encryptor::new(&entity).encrypt(b"same").expect("Failed to encrypt");
    assert_ne!(first, second);
}

#[test]
#[allow(clippy::missing_panics_doc)]
pub fn gzip_layer_is_standard() {
    let compressed = compression::gzip(b"hello world", 6).expect("Failed to gzip");
    assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
    assert_eq!(
        compression::gunzip(&compressed).expect("Failed to gunzip"),
        b"hello world"
    );
}
