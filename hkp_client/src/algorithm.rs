/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

use std::fmt::{Display, Formatter};

// Loosely after RFC 2440, section 9.1.
const ALGORITHMS: [(u32, &str); 8] = [
    (1, "RSA (Encrypt or Sign)"),
    (2, "RSA Encrypt-Only"),
    (3, "RSA Sign-Only"),
    (16, "Elgamal (Encrypt-Only)"),
    (17, "DSA (Digital Signature Standard)"),
    (18, "Elliptic Curve"),
    (19, "ECDSA"),
    (20, "Elgamal (Encrypt or Sign)"),
];

/// Public key algorithm of a key as announced by the keyserver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Named { code: u32, name: &'static str },
    Unknown(u32),
}

impl Algorithm {
    pub fn from_code(code: u32) -> Self {
        ALGORITHMS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(code, name)| Algorithm::Named { code, name })
            .unwrap_or(Algorithm::Unknown(code))
    }

    pub fn code(&self) -> u32 {
        match self {
            Algorithm::Named { code, .. } => *code,
            Algorithm::Unknown(code) => *code,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        match self {
            Algorithm::Named { name, .. } => Some(name),
            Algorithm::Unknown(_) => None,
        }
    }
}

impl From<u32> for Algorithm {
    fn from(code: u32) -> Self {
        Algorithm::from_code(code)
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Named { name, .. } => write!(f, "{}", name),
            Algorithm::Unknown(code) => write!(f, "{}", code),
        }
    }
}
