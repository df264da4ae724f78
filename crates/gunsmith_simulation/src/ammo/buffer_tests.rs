//! Tests for AmmoBuffer.

#[cfg(test)]
mod tests {
    use super::super::buffer::AmmoBuffer;
    use crate::ammo::BulletType;

    #[test]
    fn test_buffer_put_35_into_30() {
        let mut buffer = AmmoBuffer::with_capacity(30);

        let results: Vec<bool> = (0..35).map(|_| buffer.put(BulletType::StandardFmj)).collect();

        assert_eq!(buffer.count(), 30);
        assert!(buffer.is_full());
        assert!(results[..30].iter().all(|ok| *ok));
        // Последние 5 отклонены, count не сдвинулся
        assert!(results[30..].iter().all(|ok| !*ok));
    }

    #[test]
    fn test_buffer_get_empty() {
        let mut buffer: AmmoBuffer<BulletType> = AmmoBuffer::with_capacity(4);
        assert!(buffer.is_empty());
        assert_eq!(buffer.get(), None);
        assert_eq!(buffer.count(), 0);
    }

    #[test]
    fn test_buffer_fifo_order() {
        let mut buffer = AmmoBuffer::with_capacity(4);
        buffer.put(BulletType::Tracer);
        buffer.put(BulletType::Subsonic);
        buffer.put(BulletType::ArmorPiercing);

        assert_eq!(buffer.get(), Some(BulletType::Tracer));
        assert_eq!(buffer.get(), Some(BulletType::Subsonic));
        assert_eq!(buffer.get(), Some(BulletType::ArmorPiercing));
        assert_eq!(buffer.get(), None);
    }

    #[test]
    fn test_buffer_fifo_across_wraparound() {
        // Интерливинг put/get гоняет head по кругу несколько раз
        let mut buffer = AmmoBuffer::with_capacity(3);
        let mut expected = std::collections::VecDeque::new();
        let mut next = 0u32;

        for step in 0..50 {
            if step % 3 != 2 && !buffer.is_full() {
                assert!(buffer.put(next));
                expected.push_back(next);
                next += 1;
            } else {
                assert_eq!(buffer.get(), expected.pop_front());
            }
            assert_eq!(buffer.count(), expected.len());
        }

        while let Some(value) = expected.pop_front() {
            assert_eq!(buffer.get(), Some(value));
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_buffer_capacity_never_changes() {
        let mut buffer = AmmoBuffer::with_capacity(7);
        buffer.put_many(1u8, 100);
        buffer.remove_many(100);
        buffer.clear();
        assert_eq!(buffer.capacity(), 7);
    }

    #[test]
    fn test_buffer_remove_many_best_effort() {
        let mut buffer = AmmoBuffer::with_capacity(10);
        buffer.put_many(BulletType::HollowPointSp, 3);

        // Просим 5 - получаем 3 (partial drain, не all-or-nothing)
        let removed = buffer.remove_many(5);
        assert_eq!(removed.len(), 3);
        assert!(buffer.is_empty());

        // На пустом - пустой результат, без паники
        assert!(buffer.remove_many(2).is_empty());
    }

    #[test]
    fn test_buffer_remove_many_partial_keeps_rest() {
        let mut buffer = AmmoBuffer::with_capacity(5);
        for value in 1..=5u8 {
            buffer.put(value);
        }

        assert_eq!(buffer.remove_many(2), vec![1, 2]);
        assert_eq!(buffer.count(), 3);
        assert_eq!(buffer.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_buffer_put_many_stops_when_full() {
        let mut buffer = AmmoBuffer::with_capacity(4);
        buffer.put(BulletType::Tracer);
        assert_eq!(buffer.put_many(BulletType::StandardFmj, 10), 3);
        assert!(buffer.is_full());
    }

    #[test]
    fn test_buffer_zero_capacity() {
        let mut buffer = AmmoBuffer::with_capacity(0);
        assert!(buffer.is_empty());
        assert!(buffer.is_full());
        assert!(!buffer.put(BulletType::Tracer));
        assert_eq!(buffer.get(), None);
    }
}
