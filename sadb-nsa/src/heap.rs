use std::cmp::Ordering;

///
/// Array-backed binary min-heap ordered by an injected comparison function.
///
/// Elements that compare equal come out in the order they were inserted.
///
pub struct MinHeap<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    items: Vec<(T, u64)>,
    compare: F,
    next_sequence: u64,
}

impl<T, F> MinHeap<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    pub fn new(compare: F) -> Self {
        MinHeap {
            items: Vec::new(),
            compare,
            next_sequence: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.first().map(|(item, _)| item)
    }

    pub fn push(&mut self, item: T) {
        self.items.push((item, self.next_sequence));
        self.next_sequence += 1;
        self.sift_up(self.items.len() - 1);
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let (item, _) = self.items.pop()?;
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some(item)
    }

    fn less(&self, a: usize, b: usize) -> bool {
        let (item_a, seq_a) = &self.items[a];
        let (item_b, seq_b) = &self.items[b];
        (self.compare)(item_a, item_b).then(seq_a.cmp(seq_b)) == Ordering::Less
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.less(i, parent) {
                break;
            }
            self.items.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;

            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.items.swap(i, smallest);
            i = smallest;
        }
    }
}
