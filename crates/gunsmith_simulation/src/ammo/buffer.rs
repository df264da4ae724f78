//! AmmoBuffer - кольцевой FIFO буфер точной ёмкости
//!
//! Ёмкость задаётся при создании и больше не меняется.
//! `put` на полном буфере и `get` на пустом ничего не мутируют.

/// Fixed-capacity circular buffer
#[derive(Debug, Clone, PartialEq)]
pub struct AmmoBuffer<T: Copy> {
    slots: Box<[Option<T>]>,
    /// Индекс самого старого элемента
    head: usize,
    count: usize,
}

impl<T: Copy> AmmoBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            head: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Добавить в хвост. `false` если буфер полон (без мутации)
    pub fn put(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }

        let tail = (self.head + self.count) % self.slots.len();
        self.slots[tail] = Some(item);
        self.count += 1;
        true
    }

    /// Достать самый старый. `None` если пусто
    pub fn get(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        item
    }

    /// Положить `n` копий; останавливается на первом отказе. Возвращает сколько легло
    pub fn put_many(&mut self, item: T, n: usize) -> usize {
        let mut added = 0;
        while added < n && self.put(item) {
            added += 1;
        }
        added
    }

    /// Best-effort drain: снимает `min(n, count)` самых старых (в FIFO порядке)
    pub fn remove_many(&mut self, n: usize) -> Vec<T> {
        let take = n.min(self.count);
        let mut removed = Vec::with_capacity(take);
        for _ in 0..take {
            if let Some(item) = self.get() {
                removed.push(item);
            }
        }
        removed
    }

    /// Очистить без смены ёмкости
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.count = 0;
    }

    /// Неразрушающий обход от старого к новому (debug/UI)
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let capacity = self.slots.len();
        (0..self.count).filter_map(move |offset| self.slots[(self.head + offset) % capacity])
    }
}
