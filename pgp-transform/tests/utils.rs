#![allow(dead_code)]

use pgp_transform::{build_entity, Entity};

pub const PUBLIC_KEY: &str = include_str!("../test-data/keys/public_key_rsa4096.asc");
pub const PRIVATE_KEY: &str = include_str!("../test-data/keys/locked_private_key_rsa4096.asc");
pub const PASSPHRASE: &[u8] = b"password";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_entity() -> Entity {
    init_logger();
    build_entity(PUBLIC_KEY.as_bytes(), PRIVATE_KEY.as_bytes()).expect("Failed to build entity")
}

pub fn public_entity() -> Entity {
    build_entity(PUBLIC_KEY.as_bytes(), &[]).expect("Failed to build entity")
}

/// Replaces one base64 character in the middle of the armored body.
pub fn flip_armor_body_char(armored: &[u8]) -> Vec<u8> {
    let text = std::str::from_utf8(armored).expect("Armor is utf-8");
    let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
    let body: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.len() == 64)
        .map(|(index, _)| index)
        .collect();
    let target = body[body.len() / 2];
    let line = &mut lines[target];
    let replacement = if line.as_bytes()[10] == b'A' { "B" } else { "A" };
    line.replace_range(10..11, replacement);
    let mut out = lines.join("\n");
    out.push('\n');
    out.into_bytes()
}
