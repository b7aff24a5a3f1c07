//! Set of cameras in a session plus the single "selected" camera the user
//! last clicked on.

use std::collections::BTreeMap;
use std::fmt;

/// Session-unique camera handle. Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CameraId(u32);

impl CameraId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera-{}", self.0)
    }
}

/// Cameras keyed by [`CameraId`], iterated in insertion order.
#[derive(Debug)]
pub struct CameraRegistry<C> {
    cameras: BTreeMap<CameraId, C>,
    next_id: u32,
    selected: Option<CameraId>,
}

impl<C> Default for CameraRegistry<C> {
    fn default() -> Self {
        Self {
            cameras: BTreeMap::new(),
            next_id: 0,
            selected: None,
        }
    }
}

impl<C> CameraRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, camera: C) -> CameraId {
        let id = CameraId(self.next_id);
        self.next_id += 1;
        self.cameras.insert(id, camera);
        id
    }

    /// Remove a camera, dropping the selection if it pointed there.
    pub fn remove(&mut self, id: CameraId) -> Option<C> {
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.cameras.remove(&id)
    }

    pub fn get(&self, id: CameraId) -> Option<&C> {
        self.cameras.get(&id)
    }

    pub fn get_mut(&mut self, id: CameraId) -> Option<&mut C> {
        self.cameras.get_mut(&id)
    }

    /// Click semantics: selecting the selected camera deselects it, selecting
    /// another one moves the selection. Returns the new selection.
    pub fn toggle_selection(&mut self, id: CameraId) -> Option<CameraId> {
        if !self.cameras.contains_key(&id) {
            return self.selected;
        }
        self.selected = if self.selected == Some(id) { None } else { Some(id) };
        self.selected
    }

    pub fn selected(&self) -> Option<CameraId> {
        self.selected
    }

    pub fn selected_mut(&mut self) -> Option<&mut C> {
        let id = self.selected?;
        self.cameras.get_mut(&id)
    }

    pub fn is_selected(&self, id: CameraId) -> bool {
        self.selected == Some(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CameraId, &C)> {
        self.cameras.iter().map(|(id, c)| (*id, c))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (CameraId, &mut C)> {
        self.cameras.iter_mut().map(|(id, c)| (*id, c))
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}
