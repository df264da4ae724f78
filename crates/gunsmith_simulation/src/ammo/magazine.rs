//! Magazine - съёмный магазин (AmmoBuffer + модель)

use super::{AmmoBuffer, BulletType, MagazineType};
use crate::error::AssemblyError;
use crate::logger::{log, log_warning};

/// Съёмный магазин.
///
/// Ёмкость фиксируется при создании: из `MagazineType` или явно.
#[derive(Debug, Clone, PartialEq)]
pub struct Magazine {
    /// Модель (None = generic магазин с явной ёмкостью)
    pub magazine_type: Option<MagazineType>,
    buffer: AmmoBuffer<BulletType>,
}

impl Magazine {
    /// Магазин конкретной модели (пустой)
    pub fn new(magazine_type: MagazineType) -> Self {
        Self {
            magazine_type: Some(magazine_type),
            buffer: AmmoBuffer::with_capacity(magazine_type.capacity()),
        }
    }

    /// Generic магазин с явной ёмкостью (пустой)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            magazine_type: None,
            buffer: AmmoBuffer::with_capacity(capacity),
        }
    }

    /// Builder: дозарядить до полного
    pub fn filled(mut self, bullet: BulletType) -> Self {
        self.fill(bullet);
        self
    }

    /// Дозарядить до полного, вернуть сколько добавлено
    pub fn fill(&mut self, bullet: BulletType) -> usize {
        if !bullet.is_valid() {
            return 0;
        }
        let free = self.buffer.capacity() - self.buffer.count();
        self.buffer.put_many(bullet, free)
    }

    /// Добавить один патрон. `false` если полон (или sentinel)
    pub fn add_bullet(&mut self, bullet: BulletType) -> bool {
        match self.try_add_bullet(bullet) {
            Ok(()) => {
                log(&format!(
                    "Magazine added bullet: {} (AmmoCount={})",
                    bullet.display_name(),
                    self.buffer.count()
                ));
                true
            }
            Err(e) => {
                log_warning(&format!("Magazine: {}", e));
                false
            }
        }
    }

    fn try_add_bullet(&mut self, bullet: BulletType) -> Result<(), AssemblyError> {
        if !bullet.is_valid() {
            return Err(AssemblyError::MissingCollaborator("bullet"));
        }
        if !self.buffer.put(bullet) {
            return Err(AssemblyError::BufferFull);
        }
        Ok(())
    }

    /// Снять самый старый патрон
    pub fn remove_bullet(&mut self) -> Option<BulletType> {
        let bullet = self.buffer.get();
        if bullet.is_none() {
            log_warning(&format!("Magazine: {}", AssemblyError::BufferEmpty));
        }
        bullet
    }

    /// Разрядить до `n` патронов (best-effort)
    pub fn unload(&mut self, n: usize) -> Vec<BulletType> {
        self.buffer.remove_many(n)
    }

    pub fn ammo_count(&self) -> usize {
        self.buffer.count()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }

    pub fn buffer(&self) -> &AmmoBuffer<BulletType> {
        &self.buffer
    }

    /// Содержимое для логов (не разрушает буфер)
    pub fn describe(&self) -> String {
        if self.buffer.is_empty() {
            return "Buffer is EMPTY".to_string();
        }
        self.buffer
            .iter()
            .enumerate()
            .map(|(i, bullet)| format!("[{:02}] {}", i, bullet.display_name()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magazine_capacity_from_type() {
        let mag = Magazine::new(MagazineType::ProMagDrum50);
        assert_eq!(mag.capacity(), 50);
        assert!(mag.is_empty());
    }

    #[test]
    fn test_magazine_filled() {
        let mag = Magazine::new(MagazineType::MagpulMoe10).filled(BulletType::Subsonic);
        assert_eq!(mag.ammo_count(), 10);
        assert!(mag.is_full());
    }

    #[test]
    fn test_magazine_fill_tops_up() {
        let mut mag = Magazine::with_capacity(5);
        assert!(mag.add_bullet(BulletType::Tracer));
        assert_eq!(mag.fill(BulletType::StandardFmj), 4);
        assert_eq!(mag.remove_bullet(), Some(BulletType::Tracer));
        assert_eq!(mag.remove_bullet(), Some(BulletType::StandardFmj));
    }

    #[test]
    fn test_magazine_full_reports_buffer_full() {
        let mut mag = Magazine::with_capacity(1);
        assert_eq!(mag.try_add_bullet(BulletType::Tracer), Ok(()));
        assert_eq!(mag.try_add_bullet(BulletType::Tracer), Err(AssemblyError::BufferFull));
        assert!(!mag.add_bullet(BulletType::Subsonic));
        assert_eq!(mag.ammo_count(), 1);
        assert_eq!(
            mag.try_add_bullet(BulletType::None),
            Err(AssemblyError::MissingCollaborator("bullet"))
        );
    }

    #[test]
    fn test_magazine_unload_best_effort() {
        let mut mag = Magazine::with_capacity(5);
        mag.add_bullet(BulletType::Tracer);
        mag.add_bullet(BulletType::Subsonic);
        mag.add_bullet(BulletType::HuntingJsp);

        // FIFO порядок, не больше чем есть
        assert_eq!(mag.unload(2), vec![BulletType::Tracer, BulletType::Subsonic]);
        assert_eq!(mag.unload(10), vec![BulletType::HuntingJsp]);
        assert!(mag.unload(1).is_empty());
        assert!(mag.is_empty());
    }

    #[test]
    fn test_magazine_rejects_sentinel() {
        let mut mag = Magazine::with_capacity(3);
        assert!(!mag.add_bullet(BulletType::None));
        assert_eq!(mag.fill(BulletType::None), 0);
        assert!(mag.is_empty());
    }

    #[test]
    fn test_magazine_describe_non_destructive() {
        let mag = Magazine::with_capacity(2).filled(BulletType::ArmorPiercing);
        let text = mag.describe();
        assert!(text.contains("[00] Armor Piercing"));
        assert!(text.contains("[01] Armor Piercing"));
        assert_eq!(mag.ammo_count(), 2);
    }
}
