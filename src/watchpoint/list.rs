//! Arena-backed doubly linked list used to hold a set's watchpoints.
//!
//! Entries are addressed by a [`ListKey`] that carries a generation, so a
//! stale key held by a watchpoint that was already removed can never unlink
//! whatever entry later reuses the same slot.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListKey {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Entry<T> {
    value: Option<T>,
    generation: u32,
    prev: Option<u32>,
    next: Option<u32>,
}

#[derive(Debug)]
pub(crate) struct WatcherList<T> {
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl<T> Default for WatcherList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }
}

impl<T> WatcherList<T> {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `value` and returns the key that removes it again.
    pub(crate) fn push_back(
        &mut self,
        value: T,
    ) -> ListKey {
        let index = match self.free.pop() {
            Some(index) => {
                let entry = &mut self.entries[index as usize];
                entry.value = Some(value);
                entry.prev = self.tail;
                entry.next = None;
                index
            }
            None => {
                let index = u32::try_from(self.entries.len())
                    .expect("watcher list exceeds u32::MAX entries");
                self.entries.push(Entry {
                    value: Some(value),
                    generation: 0,
                    prev: self.tail,
                    next: None,
                });
                index
            }
        };

        match self.tail {
            Some(tail) => self.entries[tail as usize].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;

        ListKey {
            index,
            generation: self.entries[index as usize].generation,
        }
    }

    pub(crate) fn front(&self) -> Option<&T> {
        self.head.and_then(|index| self.entries[index as usize].value.as_ref())
    }

    pub(crate) fn contains(
        &self,
        key: ListKey,
    ) -> bool {
        self.entries
            .get(key.index as usize)
            .is_some_and(|entry| entry.generation == key.generation && entry.value.is_some())
    }

    /// Unlinks the entry behind `key`. Stale keys return `None`.
    pub(crate) fn remove(
        &mut self,
        key: ListKey,
    ) -> Option<T> {
        if !self.contains(key) {
            return None;
        }

        let (prev, next) = {
            let entry = &self.entries[key.index as usize];
            (entry.prev, entry.next)
        };

        match prev {
            Some(prev) => self.entries[prev as usize].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.entries[next as usize].prev = prev,
            None => self.tail = prev,
        }

        let entry = &mut self.entries[key.index as usize];
        entry.prev = None;
        entry.next = None;
        entry.generation = entry.generation.wrapping_add(1);
        let value = entry.value.take();

        self.free.push(key.index);
        self.len -= 1;
        value
    }
}
