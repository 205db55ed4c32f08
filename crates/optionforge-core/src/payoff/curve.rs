//! 만기 손익 곡선.

use serde::{Deserialize, Serialize};

/// 곡선 위의 한 점.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    /// 만기 시점 기초자산 가격
    pub underlying_price: f64,
    /// 손익
    pub profit_loss: f64,
}

/// 가격 오름차순으로 정렬된 만기 손익 곡선.
///
/// 레그나 범위가 바뀌면 새로 계산되며, 생성 후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffCurve {
    points: Vec<PayoffPoint>,
}

impl PayoffCurve {
    pub(crate) fn from_points(points: Vec<PayoffPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PayoffPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 샘플 가격 `price`에서의 손익.
    ///
    /// 샘플 지점만 조회하며 보간하지 않습니다.
    pub fn value_at(&self, price: f64) -> Option<f64> {
        let tolerance = 1e-9 * price.abs().max(1.0);
        self.points
            .iter()
            .find(|p| (p.underlying_price - price).abs() <= tolerance)
            .map(|p| p.profit_loss)
    }

    /// 최대 이익 지점 (동률이면 가장 낮은 가격).
    pub fn max_profit(&self) -> Option<PayoffPoint> {
        self.points.iter().copied().reduce(|best, p| {
            if p.profit_loss > best.profit_loss {
                p
            } else {
                best
            }
        })
    }

    /// 최대 손실 지점 (동률이면 가장 낮은 가격).
    pub fn max_loss(&self) -> Option<PayoffPoint> {
        self.points.iter().copied().reduce(|worst, p| {
            if p.profit_loss < worst.profit_loss {
                p
            } else {
                worst
            }
        })
    }

    /// 손익 부호가 바뀌는 가격 목록 (오름차순).
    ///
    /// 인접 샘플 사이의 부호 변화는 선형 보간합니다. 부호가 0인 구간을 사이에
    /// 두고 바뀌면 그 구간의 중간 가격을 돌려줍니다 (0인 샘플이 하나면 그 샘플).
    /// 같은 부호로 돌아오는 0 접점은 포함하지 않습니다.
    pub fn breakevens(&self) -> Vec<f64> {
        let mut result = Vec::new();
        let mut last_nonzero: Option<(usize, PayoffPoint)> = None;

        for (i, &point) in self.points.iter().enumerate() {
            if point.profit_loss == 0.0 {
                continue;
            }

            if let Some((j, prev)) = last_nonzero {
                if prev.profit_loss * point.profit_loss < 0.0 {
                    if j + 1 == i {
                        let t = prev.profit_loss / (prev.profit_loss - point.profit_loss);
                        result.push(
                            prev.underlying_price
                                + t * (point.underlying_price - prev.underlying_price),
                        );
                    } else {
                        let first_zero = self.points[j + 1].underlying_price;
                        let last_zero = self.points[i - 1].underlying_price;
                        result.push((first_zero + last_zero) / 2.0);
                    }
                }
            }

            last_nonzero = Some((i, point));
        }

        result
    }
}
