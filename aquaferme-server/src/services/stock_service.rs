use std::sync::Arc;

use aquaferme_api::models::VenteStatut;
use sqlx::{Sqlite, Transaction};

use crate::errors::{ApiError, VenteError};
use crate::repositories::LotRepository;

/// Quantity of a lot a sale keeps out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockHold {
    pub lot_id: i32,
    pub quantite: i32,
}

impl StockHold {
    /// A cancelled sale holds nothing.
    pub fn of(lot_id: i32, quantite: i32, statut: VenteStatut) -> Self {
        Self {
            lot_id,
            quantite: if statut.holds_stock() { quantite } else { 0 },
        }
    }
}

/// Signed change to apply to the stock of a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub lot_id: i32,
    pub delta: i32,
}

/// Stock changes that take a sale from `before` to `after`.
///
/// `None` stands for a sale that does not exist yet or no longer exists.
/// Restorations come first so a move between lots never blocks on the
/// decrement of the new lot.
pub fn plan_adjustments(
    before: Option<StockHold>,
    after: Option<StockHold>,
) -> Vec<StockAdjustment> {
    let adjustments = match (before, after) {
        (None, None) => vec![],
        (None, Some(new)) => vec![StockAdjustment {
            lot_id: new.lot_id,
            delta: -new.quantite,
        }],
        (Some(old), None) => vec![StockAdjustment {
            lot_id: old.lot_id,
            delta: old.quantite,
        }],
        (Some(old), Some(new)) if old.lot_id == new.lot_id => vec![StockAdjustment {
            lot_id: old.lot_id,
            delta: old.quantite - new.quantite,
        }],
        (Some(old), Some(new)) => vec![
            StockAdjustment {
                lot_id: old.lot_id,
                delta: old.quantite,
            },
            StockAdjustment {
                lot_id: new.lot_id,
                delta: -new.quantite,
            },
        ],
    };

    adjustments.into_iter().filter(|a| a.delta != 0).collect()
}

pub struct StockService {
    lot_repository: Arc<LotRepository>,
}

impl StockService {
    pub fn new(lot_repository: Arc<LotRepository>) -> Self {
        Self { lot_repository }
    }

    /// Applies every adjustment inside the caller's transaction.
    ///
    /// Stops at the first lot that is missing or would go negative; the caller
    /// drops the transaction so nothing is written.
    pub async fn apply(
        &self,
        adjustments: &[StockAdjustment],
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), ApiError> {
        for adjustment in adjustments {
            let applied = self
                .lot_repository
                .adjust_stock(adjustment.lot_id, adjustment.delta, transaction)
                .await?;

            if applied {
                continue;
            }

            let lot = self
                .lot_repository
                .lock_by_id(adjustment.lot_id, transaction)
                .await?
                .ok_or(VenteError::LotNotFound)?;

            tracing::warn!(
                "insufficient stock in lot {}: {} available, {} requested",
                lot.id,
                lot.quantite,
                -adjustment.delta
            );

            return Err(VenteError::InsufficientStock {
                lot_id: lot.id,
                available: lot.quantite,
                requested: -adjustment.delta,
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aquaferme_api::models::UserRole;

    use crate::tests::*;

    use super::*;

    fn hold(lot_id: i32, quantite: i32) -> Option<StockHold> {
        Some(StockHold { lot_id, quantite })
    }

    fn adjustment(lot_id: i32, delta: i32) -> StockAdjustment {
        StockAdjustment { lot_id, delta }
    }

    #[test]
    fn test_plan_create_and_delete() {
        assert_eq!(plan_adjustments(None, hold(1, 10)), vec![adjustment(1, -10)]);
        assert_eq!(plan_adjustments(hold(1, 10), None), vec![adjustment(1, 10)]);
        assert!(plan_adjustments(None, None).is_empty());
    }

    #[test]
    fn test_plan_same_lot_uses_delta() {
        assert_eq!(plan_adjustments(hold(1, 10), hold(1, 15)), vec![adjustment(1, -5)]);
        assert_eq!(plan_adjustments(hold(1, 10), hold(1, 4)), vec![adjustment(1, 6)]);
        assert!(plan_adjustments(hold(1, 10), hold(1, 10)).is_empty());
    }

    #[test]
    fn test_plan_lot_change_restores_old_lot() {
        assert_eq!(
            plan_adjustments(hold(1, 10), hold(2, 7)),
            vec![adjustment(1, 10), adjustment(2, -7)]
        );
    }

    #[test]
    fn test_cancelled_sale_holds_nothing() {
        let cancelled = StockHold::of(1, 10, VenteStatut::Annulee);
        let active = StockHold::of(1, 10, VenteStatut::Payee);

        assert_eq!(cancelled.quantite, 0);
        assert_eq!(plan_adjustments(Some(active), Some(cancelled)), vec![adjustment(1, 10)]);
        assert_eq!(plan_adjustments(Some(cancelled), Some(active)), vec![adjustment(1, -10)]);
        assert!(plan_adjustments(None, Some(cancelled)).is_empty());
    }

    #[tokio::test]
    async fn test_apply_is_all_or_nothing() {
        let storage = setup_test_db().await;
        let lot_repository = Arc::new(LotRepository::new(storage.clone()));
        let service = StockService::new(lot_repository.clone());
        create_test_user(storage.clone(), "admin@ferme.test", "secret", &UserRole::Admin).await;
        let first = create_test_lot(storage.clone(), "L-first", 20, None).await;
        let second = create_test_lot(storage.clone(), "L-second", 5, None).await;

        let mut tx = storage.get_pool().begin().await.unwrap();
        let result = service
            .apply(
                &[adjustment(first.id, 10), adjustment(second.id, -8)],
                &mut tx,
            )
            .await;
        drop(tx);

        match result {
            Err(ApiError::VenteError(VenteError::InsufficientStock {
                lot_id,
                available,
                requested,
            })) => {
                assert_eq!(lot_id, second.id);
                assert_eq!(available, 5);
                assert_eq!(requested, 8);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let first = lot_repository.find_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(first.quantite, 20);
    }

    #[tokio::test]
    async fn test_apply_unknown_lot() {
        let storage = setup_test_db().await;
        let service = StockService::new(Arc::new(LotRepository::new(storage.clone())));

        let mut tx = storage.get_pool().begin().await.unwrap();
        let result = service.apply(&[adjustment(99, -1)], &mut tx).await;

        assert!(matches!(
            result,
            Err(ApiError::VenteError(VenteError::LotNotFound))
        ));
    }
}
