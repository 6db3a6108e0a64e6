//! Isolation checks over before/after fingerprints of a pattern.
//!
//! The editor runs these after every mutation in debug builds, and the
//! property tests run them unconditionally.

use std::collections::BTreeMap;

use crate::error::IsolationViolation;
use crate::layer::{LayerId, LayerTrack};
use crate::pattern::Pattern;
use crate::pixel::Fnv1a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerFingerprint {
    pub stored_frames: usize,
    pub hash: u64,
}

impl LayerFingerprint {
    pub fn capture(layer: &LayerTrack) -> Self {
        let mut hash = Fnv1a::new();
        for (index, frame) in layer.frames() {
            hash.write(&index.to_le_bytes());
            hash.write(&frame.duration_ms.to_le_bytes());
            hash.write(&[frame.is_baked as u8]);
            hash.write(&[match frame.visible {
                None => 0,
                Some(false) => 1,
                Some(true) => 2,
            }]);
            hash.write(&frame.opacity.map_or(-1.0f32, |o| o).to_le_bytes());
            frame.pixels.feed(&mut hash);
            if let Some(alpha) = &frame.alpha {
                hash.write(alpha);
            }
        }
        for action in layer.actions() {
            hash.write(action.kind.as_str().as_bytes());
            hash.write(&action.start_frame.to_le_bytes());
            hash.write(&action.end_frame.map_or(u64::MAX, u64::from).to_le_bytes());
            hash.write(&[action.finalized as u8]);
            for (key, value) in action.params.iter() {
                hash.write(key.as_bytes());
                hash.write(value.to_string().as_bytes());
            }
        }
        Self {
            stored_frames: layer.stored_frames(),
            hash: hash.finish(),
        }
    }
}

/// Per-layer fingerprints of a pattern at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSnapshot {
    layers: BTreeMap<LayerId, LayerFingerprint>,
}

impl PatternSnapshot {
    pub fn capture(pattern: &Pattern) -> Self {
        Self::capture_layers(pattern.layers())
    }

    pub fn capture_layers(layers: &[LayerTrack]) -> Self {
        Self {
            layers: layers
                .iter()
                .map(|layer| (layer.id, LayerFingerprint::capture(layer)))
                .collect(),
        }
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerFingerprint> {
        self.layers.get(&id)
    }

    pub fn layer_ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.keys().copied()
    }
}

/// Every layer other than `active` is byte-identical in `after`, and no
/// layer appeared or disappeared.
pub fn assert_only_layer_changed(
    before: &PatternSnapshot,
    after: &PatternSnapshot,
    active: LayerId,
) -> Result<(), IsolationViolation> {
    for (id, fingerprint) in &before.layers {
        if *id == active {
            continue;
        }
        if after.layers.get(id) != Some(fingerprint) {
            return Err(IsolationViolation::CrossLayerMutation {
                mutated: *id,
                active,
            });
        }
    }
    if let Some(added) = after
        .layers
        .keys()
        .find(|id| **id != active && !before.layers.contains_key(id))
    {
        return Err(IsolationViolation::CrossLayerMutation {
            mutated: *added,
            active,
        });
    }
    Ok(())
}

/// The number of stored frames in `layer` changed by exactly `expected`.
pub fn assert_frame_count_change(
    before: &PatternSnapshot,
    after: &PatternSnapshot,
    layer: LayerId,
    expected: i64,
) -> Result<(), IsolationViolation> {
    let count = |snapshot: &PatternSnapshot| {
        snapshot
            .layer(layer)
            .map_or(0, |fp| fp.stored_frames as i64)
    };
    let actual = count(after) - count(before);
    if actual != expected {
        return Err(IsolationViolation::UnexpectedFrameCount {
            layer,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Nothing changed at all; used around read-only renders.
pub fn assert_unchanged(
    before: &PatternSnapshot,
    after: &PatternSnapshot,
) -> Result<(), IsolationViolation> {
    if before == after {
        Ok(())
    } else {
        Err(IsolationViolation::RenderMutated)
    }
}
