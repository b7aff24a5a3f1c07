//! Recognition results and the lock-guarded slot that hands them from the
//! recognition worker to the render thread.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::{Error, Result};
use crate::tracker::BoundingBox;

/// One recognized face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDetection {
    pub bbox: BoundingBox,
    /// Identity label, `"Unknown"` or similar for strangers.
    pub label: String,
    /// Confidence as the recognizer wants it displayed, e.g. `"87%"`.
    pub confidence: String,
}

impl FaceDetection {
    pub fn new(bbox: BoundingBox, label: impl Into<String>, confidence: impl Into<String>) -> Self {
        Self {
            bbox,
            label: label.into(),
            confidence: confidence.into(),
        }
    }
}

/// Everything one recognition cycle found, replaced wholesale each cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionSnapshot {
    detections: Vec<FaceDetection>,
    generation: u64,
}

impl DetectionSnapshot {
    pub fn new(detections: Vec<FaceDetection>) -> Self {
        Self {
            detections,
            generation: 0,
        }
    }

    /// Build from the recognizer's three parallel, index-aligned sequences.
    pub fn from_parallel(
        boxes: Vec<BoundingBox>,
        labels: Vec<String>,
        confidences: Vec<String>,
    ) -> Result<Self> {
        if boxes.len() != labels.len() || boxes.len() != confidences.len() {
            return Err(Error::SnapshotMismatch {
                boxes: boxes.len(),
                labels: labels.len(),
                confidences: confidences.len(),
            });
        }
        let detections = boxes
            .into_iter()
            .zip(labels)
            .zip(confidences)
            .map(|((bbox, label), confidence)| FaceDetection {
                bbox,
                label,
                confidence,
            })
            .collect();
        Ok(Self::new(detections))
    }

    pub fn detections(&self) -> &[FaceDetection] {
        &self.detections
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.detections.iter().map(|d| d.label.as_str())
    }

    pub fn confidences(&self) -> impl Iterator<Item = &str> {
        self.detections.iter().map(|d| d.confidence.as_str())
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Publish counter assigned by [`SharedSnapshot::publish`]; `0` if never
    /// published.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The detection labelled `label`. Labels are not unique; when several
    /// match, the last one wins.
    pub fn find(&self, label: &str) -> Option<&FaceDetection> {
        let mut matches = self.detections.iter().filter(|d| d.label == label);
        let first = matches.next()?;
        match matches.last() {
            Some(last) => {
                debug!(label, generation = self.generation, "duplicate label in snapshot");
                Some(last)
            }
            None => Some(first),
        }
    }
}

/// Latest committed [`DetectionSnapshot`], shared between the recognition
/// worker (writer) and the render thread (reader).
///
/// A publish swaps in the whole snapshot under the lock, so readers only ever
/// see complete cycles. Readers hold the lock just long enough to clone an
/// `Arc`.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<Mutex<Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    current: Arc<DetectionSnapshot>,
    published: u64,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `snapshot` as the latest cycle and return its generation.
    pub fn publish(&self, mut snapshot: DetectionSnapshot) -> u64 {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        slot.published += 1;
        snapshot.generation = slot.published;
        slot.current = Arc::new(snapshot);
        slot.published
    }

    /// The most recently committed snapshot; never blocks on recognition.
    pub fn latest(&self) -> Arc<DetectionSnapshot> {
        let slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slot.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn bbox(left: f32) -> BoundingBox {
        BoundingBox::from_ltrb(left, 10.0, left + 20.0, 30.0)
    }

    #[test]
    fn test_from_parallel_rejects_misaligned() {
        let err = DetectionSnapshot::from_parallel(
            vec![bbox(0.0), bbox(50.0)],
            vec!["alice".into()],
            vec!["90%".into(), "80%".into()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::SnapshotMismatch {
                boxes: 2,
                labels: 1,
                confidences: 2
            }
        ));
    }

    #[test]
    fn test_from_parallel_keeps_alignment() {
        let snapshot = DetectionSnapshot::from_parallel(
            vec![bbox(0.0), bbox(50.0)],
            vec!["alice".into(), "bob".into()],
            vec!["90%".into(), "80%".into()],
        )
        .unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.labels().collect::<Vec<_>>(), ["alice", "bob"]);
        assert_eq!(snapshot.find("bob").unwrap().confidence, "80%");
        assert_eq!(snapshot.find("bob").unwrap().bbox, bbox(50.0));
    }

    #[test]
    fn test_find_last_match_wins() {
        let snapshot = DetectionSnapshot::new(vec![
            FaceDetection::new(bbox(0.0), "alice", "70%"),
            FaceDetection::new(bbox(100.0), "bob", "60%"),
            FaceDetection::new(bbox(200.0), "alice", "95%"),
        ]);
        assert_eq!(snapshot.find("alice").unwrap().bbox, bbox(200.0));
        assert!(snapshot.find("carol").is_none());
        assert!(snapshot.find("Alice").is_none());
    }

    #[test]
    fn test_publish_assigns_generations() {
        let shared = SharedSnapshot::new();
        assert_eq!(shared.latest().generation(), 0);
        assert!(shared.latest().is_empty());

        assert_eq!(shared.publish(DetectionSnapshot::default()), 1);
        let second = shared.publish(DetectionSnapshot::new(vec![FaceDetection::new(
            bbox(0.0),
            "alice",
            "90%",
        )]));
        assert_eq!(second, 2);
        assert_eq!(shared.latest().generation(), 2);
        assert_eq!(shared.latest().len(), 1);
    }

    #[test]
    fn test_readers_never_see_partial_cycles() {
        let shared = SharedSnapshot::new();
        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for n in 1..=200usize {
                    let detections = (0..n % 7)
                        .map(|i| {
                            FaceDetection::new(bbox(i as f32), format!("id{n}"), format!("{n}%"))
                        })
                        .collect();
                    shared.publish(DetectionSnapshot::new(detections));
                }
            })
        };

        for _ in 0..500 {
            let snapshot = shared.latest();
            let cycle = snapshot.labels().next().map(str::to_owned);
            if let Some(cycle) = cycle {
                let n = &cycle[2..];
                assert!(snapshot.labels().all(|l| l == cycle));
                assert!(snapshot.confidences().all(|c| c == format!("{n}%")));
            }
        }
        writer.join().unwrap();
    }
}
