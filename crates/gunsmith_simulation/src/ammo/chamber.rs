//! ChamberState - патрон(ы) в патроннике

use super::BulletType;

/// Ноль или больше патронов, готовых к выстрелу.
///
/// Больше одного = дробь (pellets одной гильзы).
/// Отсутствие ствола моделируется снаружи (`Option<ChamberState>`), не здесь.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChamberState {
    rounds: Vec<BulletType>,
}

impl ChamberState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Заменить содержимое; пустой список == `clear()`.
    /// `BulletType::None` отфильтровывается: sentinel не может лежать в патроннике
    pub fn set_rounds(&mut self, rounds: impl IntoIterator<Item = BulletType>) {
        self.rounds.clear();
        self.rounds.extend(rounds.into_iter().filter(|round| round.is_valid()));
    }

    pub fn clear(&mut self) {
        self.rounds.clear();
    }

    pub fn has_round(&self) -> bool {
        !self.rounds.is_empty()
    }

    pub fn rounds(&self) -> &[BulletType] {
        &self.rounds
    }

    /// Забрать всё (выстрел)
    pub fn take_rounds(&mut self) -> Vec<BulletType> {
        std::mem::take(&mut self.rounds)
    }
}
