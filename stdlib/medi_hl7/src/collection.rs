//! Ordered segment storage with stable handles.
//!
//! Segments live in an arena of slots linked into a doubly linked order by
//! slot index. A [`SegmentId`] carries the slot and the slot's generation at
//! the time the segment was inserted; removing a segment bumps the
//! generation, so a handle to a detached segment never resolves again even
//! after its slot is reused. A slot whose generation is exhausted is retired
//! instead of reused.
//!
//! Every list also draws a unique owner id, stamped into each handle it hands
//! out, so a handle from one message never resolves inside another.

use std::sync::atomic::{AtomicU32, Ordering};

use log::trace;

use crate::address::SegmentType;
use crate::error::{not_found, Hl7Result};
use crate::options::Delimiters;
use crate::segment::Segment;

/// Stable handle to a segment inside a [`SegmentList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId {
    owner: u32,
    slot: u32,
    generation: u32,
}

static NEXT_OWNER: AtomicU32 = AtomicU32::new(0);

fn next_owner() -> u32 {
    NEXT_OWNER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
struct Node {
    segment: Segment,
    prev: Option<u32>,
    next: Option<u32>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Where to link a segment relative to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    After,
    Before,
}

/// The ordered, editable sequence of segments of one message.
///
/// A clone is a separate list: it takes a new owner id, so handles from the
/// original do not resolve in the copy.
#[derive(Debug)]
pub struct SegmentList {
    owner: u32,
    delimiters: Delimiters,
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

fn parse_type(code: &str) -> Hl7Result<SegmentType> {
    SegmentType::new(code)
}

impl SegmentList {
    pub fn new(delimiters: Delimiters) -> Self {
        Self {
            owner: next_owner(),
            delimiters,
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn from_segments(delimiters: Delimiters, segments: Vec<Segment>) -> Self {
        let mut list = Self::new(delimiters);
        for segment in segments {
            let slot = list.alloc(segment);
            list.link_back(slot);
        }
        list
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `id` still refers to a member of this list
    pub fn contains(&self, id: SegmentId) -> bool {
        self.live_slot(id).is_some()
    }

    pub fn segment(&self, id: SegmentId) -> Hl7Result<&Segment> {
        match self.live_slot(id) {
            Some(slot) => Ok(&self.node(slot).segment),
            None => Err(not_found("segment", "detached")),
        }
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> Hl7Result<&mut Segment> {
        match self.live_slot(id) {
            Some(slot) => Ok(&mut self.node_mut(slot).segment),
            None => Err(not_found("segment", "detached")),
        }
    }

    /// Iterate segments in message order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Handles of all segments in message order
    pub fn ids(&self) -> Vec<SegmentId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// First segment of the given type
    pub fn get_segment(&self, segment_type: &str) -> Hl7Result<Option<SegmentId>> {
        let wanted = parse_type(segment_type)?;
        Ok(self
            .iter()
            .find(|(_, s)| s.segment_type() == &wanted)
            .map(|(id, _)| id))
    }

    /// All segments of the given type, or every segment when `None`
    pub fn get_segments(&self, segment_type: Option<&str>) -> Hl7Result<Vec<SegmentId>> {
        let wanted = segment_type.map(parse_type).transpose()?;
        Ok(self
            .iter()
            .filter(|(_, s)| wanted.as_ref().map_or(true, |t| s.segment_type() == t))
            .map(|(id, _)| id)
            .collect())
    }

    /// Segments of `segment_type` following `start`.
    ///
    /// The scan stops before the first segment whose type is in `stop_types`.
    /// With `consecutive`, it also stops at the first non-matching segment
    /// once at least one match was collected.
    pub fn get_segments_after(
        &self,
        start: SegmentId,
        segment_type: &str,
        stop_types: &[&str],
        consecutive: bool,
    ) -> Hl7Result<Vec<SegmentId>> {
        let wanted = parse_type(segment_type)?;
        let stops = stop_types
            .iter()
            .map(|code| parse_type(code))
            .collect::<Hl7Result<Vec<_>>>()?;
        let start_slot = self.require(start, "start")?;

        let mut found = Vec::new();
        let mut cursor = self.node(start_slot).next;
        while let Some(slot) = cursor {
            let node = self.node(slot);
            let current = node.segment.segment_type();
            if stops.contains(current) {
                break;
            }
            if current == &wanted {
                found.push(self.id_of(slot));
            } else if consecutive && !found.is_empty() {
                break;
            }
            cursor = node.next;
        }

        Ok(found)
    }

    /// Append a new empty segment at the end
    pub fn create_segment(&mut self, segment_type: &str) -> Hl7Result<SegmentId> {
        let segment_type = parse_type(segment_type)?;
        let slot = self.alloc(Segment::with_delimiters(segment_type, self.delimiters));
        self.link_back(slot);
        trace!("created {} at end", self.node(slot).segment.segment_type());
        Ok(self.id_of(slot))
    }

    /// Insert a new empty segment right after `target`
    pub fn create_segment_after(
        &mut self,
        segment_type: &str,
        target: SegmentId,
    ) -> Hl7Result<SegmentId> {
        self.create_relative(segment_type, target, Placement::After)
    }

    /// Insert a new empty segment right before `target`
    pub fn create_segment_before(
        &mut self,
        segment_type: &str,
        target: SegmentId,
    ) -> Hl7Result<SegmentId> {
        self.create_relative(segment_type, target, Placement::Before)
    }

    /// Detach one segment and hand it back
    pub fn delete_segment(&mut self, id: SegmentId) -> Hl7Result<Segment> {
        let slot = self.require(id, "segment")?;
        Ok(self.remove(slot))
    }

    /// Detach several segments. Handles that are no longer members are skipped.
    pub fn delete_segments(&mut self, ids: &[SegmentId]) -> Vec<Segment> {
        let mut removed = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(slot) = self.live_slot(id) {
                removed.push(self.remove(slot));
            }
        }
        removed
    }

    /// Relink `id` immediately after `target`
    pub fn move_segment_after(&mut self, id: SegmentId, target: SegmentId) -> Hl7Result<()> {
        self.relocate(id, target, Placement::After)
    }

    /// Relink `id` immediately before `target`
    pub fn move_segment_before(&mut self, id: SegmentId, target: SegmentId) -> Hl7Result<()> {
        self.relocate(id, target, Placement::Before)
    }

    fn create_relative(
        &mut self,
        segment_type: &str,
        target: SegmentId,
        placement: Placement,
    ) -> Hl7Result<SegmentId> {
        let segment_type = parse_type(segment_type)?;
        let target_slot = self.require(target, "target")?;
        let slot = self.alloc(Segment::with_delimiters(segment_type, self.delimiters));
        self.link(slot, target_slot, placement);
        trace!(
            "created {} {:?} {}",
            self.node(slot).segment.segment_type(),
            placement,
            self.node(target_slot).segment.segment_type()
        );
        Ok(self.id_of(slot))
    }

    fn relocate(
        &mut self,
        id: SegmentId,
        target: SegmentId,
        placement: Placement,
    ) -> Hl7Result<()> {
        let slot = self.require(id, "segment")?;
        let target_slot = self.require(target, "target")?;
        if slot == target_slot {
            return Ok(());
        }

        self.unlink(slot);
        self.link(slot, target_slot, placement);
        trace!(
            "moved {} {:?} {}",
            self.node(slot).segment.segment_type(),
            placement,
            self.node(target_slot).segment.segment_type()
        );
        Ok(())
    }

    fn live_slot(&self, id: SegmentId) -> Option<u32> {
        if id.owner != self.owner {
            return None;
        }
        let slot = self.slots.get(id.slot as usize)?;
        (slot.generation == id.generation && slot.node.is_some()).then_some(id.slot)
    }

    fn require(&self, id: SegmentId, name: &str) -> Hl7Result<u32> {
        self.live_slot(id).ok_or_else(|| not_found(name, "detached"))
    }

    fn id_of(&self, slot: u32) -> SegmentId {
        SegmentId {
            owner: self.owner,
            slot,
            generation: self.slots[slot as usize].generation,
        }
    }

    fn node(&self, slot: u32) -> &Node {
        match &self.slots[slot as usize].node {
            Some(node) => node,
            None => unreachable!("slot {slot} is linked but empty"),
        }
    }

    fn node_mut(&mut self, slot: u32) -> &mut Node {
        match &mut self.slots[slot as usize].node {
            Some(node) => node,
            None => unreachable!("slot {slot} is linked but empty"),
        }
    }

    fn alloc(&mut self, segment: Segment) -> u32 {
        let node = Node {
            segment,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize].node = Some(node);
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                (self.slots.len() - 1) as u32
            }
        }
    }

    fn remove(&mut self, slot: u32) -> Segment {
        self.unlink(slot);
        let entry = &mut self.slots[slot as usize];
        let node = entry.node.take();
        match entry.generation.checked_add(1) {
            Some(generation) => {
                entry.generation = generation;
                self.free.push(slot);
            }
            None => trace!("retiring slot {slot}"),
        }
        match node {
            Some(node) => {
                trace!("deleted {}", node.segment.segment_type());
                node.segment
            }
            None => unreachable!("slot {slot} was removed twice"),
        }
    }

    fn link_back(&mut self, slot: u32) {
        match self.tail {
            Some(tail) => self.link(slot, tail, Placement::After),
            None => {
                let node = self.node_mut(slot);
                node.prev = None;
                node.next = None;
                self.head = Some(slot);
                self.tail = Some(slot);
                self.len += 1;
            }
        }
    }

    /// Link a detached slot next to a linked target
    fn link(&mut self, slot: u32, target: u32, placement: Placement) {
        let (prev, next) = match placement {
            Placement::After => (Some(target), self.node(target).next),
            Placement::Before => (self.node(target).prev, Some(target)),
        };

        {
            let node = self.node_mut(slot);
            node.prev = prev;
            node.next = next;
        }

        match prev {
            Some(p) => self.node_mut(p).next = Some(slot),
            None => self.head = Some(slot),
        }
        match next {
            Some(n) => self.node_mut(n).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.len += 1;
    }

    /// Take a linked slot out of the order without freeing it
    fn unlink(&mut self, slot: u32) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }

        let node = self.node_mut(slot);
        node.prev = None;
        node.next = None;
        self.len -= 1;
    }
}

impl Clone for SegmentList {
    fn clone(&self) -> Self {
        Self {
            owner: next_owner(),
            delimiters: self.delimiters,
            slots: self.slots.clone(),
            free: self.free.clone(),
            head: self.head,
            tail: self.tail,
            len: self.len,
        }
    }
}

/// Iterator over `(handle, segment)` pairs in message order
pub struct Iter<'a> {
    list: &'a SegmentList,
    cursor: Option<u32>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (SegmentId, &'a Segment);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.list.node(slot);
        self.cursor = node.next;
        Some((self.list.id_of(slot), &node.segment))
    }
}

impl<'a> IntoIterator for &'a SegmentList {
    type Item = (SegmentId, &'a Segment);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
