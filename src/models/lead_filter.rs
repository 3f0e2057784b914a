// src/models/lead_filter.rs

use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{LeadQuality, LeadStatus},
};

// Primeiro número do orçamento em texto livre ("75,00,000" -> 7500000, "1.5 Cr" -> 1.5).
// Sem número nenhum dá NULL, e a comparação exclui o lead.
const BUDGET_SQL: &str = "substring(replace(l.budget, ',', '') from '[0-9]+(?:\\.[0-9]+)?')::numeric";

/// Filtros como chegam na query string. "all" ou vazio significam "sem restrição".
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeadFilterParams {
    #[param(example = "new")]
    pub status: Option<String>,
    #[param(example = "hot")]
    pub quality: Option<String>,
    #[param(example = "Pune")]
    pub city: Option<String>,
    pub assigned_to: Option<String>,
    /// `YYYY-MM-DD` (dia inteiro) ou instante RFC 3339
    #[param(example = "2025-01-01")]
    pub date_from: Option<String>,
    #[param(example = "2025-01-31")]
    pub date_to: Option<String>,
    #[param(example = "villa")]
    pub what_to_buy: Option<String>,
    #[param(example = "5000000")]
    pub budget_min: Option<String>,
    pub budget_max: Option<String>,
    /// Busca em nome, e-mail ou cidade
    pub search: Option<String>,
}

/// Limite de data. Um dia sem hora cobre o dia inteiro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperBound {
    Before(DateTime<Utc>),
    AtOrBefore(DateTime<Utc>),
}

impl DateBound {
    pub fn start(&self) -> DateTime<Utc> {
        match self {
            DateBound::Day(day) => day.and_time(NaiveTime::MIN).and_utc(),
            DateBound::Instant(instant) => *instant,
        }
    }

    // Dia -> até o fim do dia (exclusivo no início do dia seguinte)
    pub fn upper(&self) -> UpperBound {
        match self {
            DateBound::Day(day) => match day.checked_add_days(Days::new(1)) {
                Some(next) => UpperBound::Before(next.and_time(NaiveTime::MIN).and_utc()),
                None => UpperBound::AtOrBefore(DateTime::<Utc>::MAX_UTC),
            },
            DateBound::Instant(instant) => UpperBound::AtOrBefore(*instant),
        }
    }
}

impl FromStr for DateBound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(DateBound::Day(day));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|instant| DateBound::Instant(instant.with_timezone(&Utc)))
            .map_err(|_| format!("'{}' is not a valid date (expected YYYY-MM-DD or RFC 3339)", s))
    }
}

/// Conjunção de restrições sobre leads. Campo `None` = sem restrição.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub quality: Option<LeadQuality>,
    pub city: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub date_from: Option<DateBound>,
    pub date_to: Option<DateBound>,
    pub what_to_buy: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub search: Option<String>,
}

fn constraint(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn parse_budget_bound(raw: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(raw)
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a valid budget amount", raw)))
}

impl TryFrom<LeadFilterParams> for LeadFilter {
    type Error = AppError;

    fn try_from(params: LeadFilterParams) -> Result<Self, Self::Error> {
        let status = constraint(params.status)
            .map(|s| s.parse::<LeadStatus>())
            .transpose()
            .map_err(AppError::InvalidInput)?;

        let quality = constraint(params.quality)
            .map(|s| s.parse::<LeadQuality>())
            .transpose()
            .map_err(AppError::InvalidInput)?;

        let assigned_to = constraint(params.assigned_to)
            .map(|s| {
                Uuid::parse_str(&s)
                    .map_err(|_| AppError::InvalidInput(format!("'{}' is not a valid user id", s)))
            })
            .transpose()?;

        let date_from = constraint(params.date_from)
            .map(|s| s.parse::<DateBound>())
            .transpose()
            .map_err(AppError::InvalidInput)?;

        let date_to = constraint(params.date_to)
            .map(|s| s.parse::<DateBound>())
            .transpose()
            .map_err(AppError::InvalidInput)?;

        let budget_min = constraint(params.budget_min)
            .map(|s| parse_budget_bound(&s))
            .transpose()?;

        let budget_max = constraint(params.budget_max)
            .map(|s| parse_budget_bound(&s))
            .transpose()?;

        Ok(LeadFilter {
            status,
            quality,
            city: constraint(params.city),
            assigned_to,
            date_from,
            date_to,
            what_to_buy: constraint(params.what_to_buy),
            budget_min,
            budget_max,
            search: constraint(params.search),
        })
    }
}

// Escapa os curingas do LIKE (\ é o escape padrão do Postgres)
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl LeadFilter {
    /// Empurra as restrições para a query (alias `l` = leads). Espera um `WHERE` já aberto.
    pub fn push_constraints(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            qb.push(" AND l.status = ").push_bind(status);
        }
        if let Some(quality) = self.quality {
            qb.push(" AND l.quality = ").push_bind(quality);
        }
        if let Some(city) = &self.city {
            qb.push(" AND l.city = ").push_bind(city.clone());
        }
        if let Some(user_id) = self.assigned_to {
            qb.push(" AND l.assigned_to = ").push_bind(user_id);
        }
        if let Some(from) = self.date_from {
            qb.push(" AND l.created_at >= ").push_bind(from.start());
        }
        if let Some(to) = self.date_to {
            match to.upper() {
                UpperBound::Before(limit) => {
                    qb.push(" AND l.created_at < ").push_bind(limit);
                }
                UpperBound::AtOrBefore(limit) => {
                    qb.push(" AND l.created_at <= ").push_bind(limit);
                }
            }
        }
        if let Some(needle) = &self.what_to_buy {
            qb.push(" AND l.what_to_buy ILIKE ").push_bind(like_pattern(needle));
        }
        if let Some(min) = self.budget_min {
            qb.push(" AND ").push(BUDGET_SQL).push(" >= ").push_bind(min);
        }
        if let Some(max) = self.budget_max {
            qb.push(" AND ").push(BUDGET_SQL).push(" <= ").push_bind(max);
        }
        if let Some(term) = &self.search {
            let pattern = like_pattern(term);
            qb.push(" AND (l.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR l.email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR l.city ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::lead::Lead;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    // O comportamento das restrições contra o banco é testado em `db::lead_repo`.

    pub(crate) fn sample_lead(name: &str, status: LeadStatus, city: &str) -> Lead {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        Lead {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: None,
            mobile: "9876543210".to_string(),
            city: city.to_string(),
            what_to_buy: None,
            budget: None,
            professional_background: None,
            notes: None,
            quality: None,
            status,
            assigned_to: None,
            followup_date: None,
            buying_date: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn all_sentinel_and_blank_mean_no_constraint() {
        let params = LeadFilterParams {
            status: Some("all".into()),
            quality: Some("ALL".into()),
            city: Some("  ".into()),
            ..Default::default()
        };
        let filter = LeadFilter::try_from(params).unwrap();
        assert_eq!(filter, LeadFilter::default());
    }

    #[test]
    fn unknown_status_in_params_is_rejected() {
        let params = LeadFilterParams {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert_matches!(LeadFilter::try_from(params), Err(AppError::InvalidInput(_)));
    }

    #[test]
    fn params_are_trimmed_and_parsed() {
        let params = LeadFilterParams {
            status: Some(" in_progress ".into()),
            city: Some(" Pune ".into()),
            budget_min: Some("1.5".into()),
            date_from: Some("2025-01-01".into()),
            ..Default::default()
        };
        let filter = LeadFilter::try_from(params).unwrap();
        assert_eq!(filter.status, Some(LeadStatus::InProgress));
        assert_eq!(filter.city.as_deref(), Some("Pune"));
        assert_eq!(filter.budget_min, Some(Decimal::from_str("1.5").unwrap()));
        assert_eq!(
            filter.date_from,
            Some(DateBound::Day(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()))
        );
    }

    #[test]
    fn non_numeric_budget_bound_is_rejected() {
        let params = LeadFilterParams {
            budget_max: Some("a lot".into()),
            ..Default::default()
        };
        assert_matches!(LeadFilter::try_from(params), Err(AppError::InvalidInput(_)));
    }

    #[test]
    fn date_only_upper_bound_covers_the_whole_day() {
        let bound: DateBound = "2025-01-31".parse().unwrap();
        assert_eq!(
            bound.upper(),
            UpperBound::Before(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(bound.start(), Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn instant_upper_bound_is_used_as_is() {
        let bound: DateBound = "2025-01-15T10:00:00Z".parse().unwrap();
        assert_eq!(
            bound.upper(),
            UpperBound::AtOrBefore(Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap())
        );
        assert!("15/01/2025".parse::<DateBound>().is_err());
    }

    #[test]
    fn sql_constraints_follow_the_filter_fields() {
        let filter = LeadFilter {
            status: Some(LeadStatus::New),
            city: Some("Pune".into()),
            date_to: Some("2025-01-31".parse().unwrap()),
            search: Some("50%".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT l.* FROM leads l WHERE TRUE");
        filter.push_constraints(&mut qb);

        let sql = qb.sql();
        assert!(sql.contains("l.status = $1"));
        assert!(sql.contains("l.city = $2"));
        assert!(sql.contains("l.created_at < $3"));
        assert!(sql.contains("(l.name ILIKE $4 OR l.email ILIKE $5 OR l.city ILIKE $6)"));
        assert_eq!(like_pattern("50%"), "%50\\%%");
    }

    #[test]
    fn empty_filter_adds_no_sql() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT l.* FROM leads l WHERE TRUE");
        LeadFilter::default().push_constraints(&mut qb);
        assert_eq!(qb.sql(), "SELECT l.* FROM leads l WHERE TRUE");
    }
}
