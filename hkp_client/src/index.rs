/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

use tracing::{debug, trace, warn};

use crate::errors::{HkpError, Result};
use crate::keyserver::KeyServer;
use crate::records::{Identity, Key};

const PUB_FIELDS: usize = 6;
const UID_FIELDS: usize = 4;

fn expect_fields(tag: &'static str, fields: &[&str], expected: usize) -> Result<()> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(HkpError::FieldCount {
            tag,
            expected,
            found: fields.len(),
        })
    }
}

fn parse_pub(server: &KeyServer, fields: &[&str]) -> Result<Key> {
    expect_fields("pub", fields, PUB_FIELDS)?;
    Key::new(server, fields[0], fields[1], fields[2], fields[3], fields[4], fields[5])
}

fn parse_uid(fields: &[&str]) -> Result<Identity> {
    expect_fields("uid", fields, UID_FIELDS)?;
    Identity::new(fields[0], fields[1], fields[2], fields[3])
}

/// Parses a machine readable index response. The first line is the info
/// banner and is skipped; `pub` lines open a key, `uid` lines attach to the
/// key opened last, everything else is ignored.
pub fn parse_index(server: &KeyServer, response: &str) -> Result<Vec<Key>> {
    let mut keys: Vec<Key> = Vec::new();
    for (number, line) in response.lines().enumerate().skip(1) {
        let mut fields: Vec<&str> = line.split(':').collect();
        let tag = fields.remove(0);
        let wrap = |e: HkpError| HkpError::Line {
            line: number + 1,
            source: Box::new(e),
        };
        match tag {
            "pub" => keys.push(parse_pub(server, &fields).map_err(wrap)?),
            "uid" => match keys.last_mut() {
                Some(key) => key.push_identity(parse_uid(&fields).map_err(wrap)?),
                None => warn!("Dropping uid record before any pub record on line {}", number + 1),
            },
            _ => trace!("Ignoring index line {}: {:?}", number + 1, line),
        }
    }
    debug!("Parsed {} keys from index response", keys.len());
    Ok(keys)
}
