// src/common/fechas.rs

//! Ayudantes de fecha: formato de presentación y las estadísticas
//! hoy / última semana que alimentan el dashboard.

use chrono::{DateTime, Datelike, Local, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Formatea una fecha como `DD/MM/YYYY` en hora local.
pub fn formatear_fecha(fecha: &DateTime<Utc>) -> String {
    fecha.with_timezone(&Local).format("%d/%m/%Y").to_string()
}

/// Sufijo `YYYYMMDD` para nombres de archivo de exportación.
pub fn sufijo_fecha(fecha: &DateTime<Utc>) -> String {
    fecha.with_timezone(&Local).format("%Y%m%d").to_string()
}

pub fn es_hoy(fecha: &DateTime<Utc>, ahora: &DateTime<Utc>) -> bool {
    let f = fecha.with_timezone(&Local);
    let h = ahora.with_timezone(&Local);
    f.day() == h.day() && f.month() == h.month() && f.year() == h.year()
}

/// Dentro de los últimos 7 días (sin contar fechas futuras).
pub fn es_esta_semana(fecha: &DateTime<Utc>, ahora: &DateTime<Utc>) -> bool {
    let diferencia = ahora.signed_duration_since(*fecha);
    diferencia >= chrono::Duration::zero() && diferencia <= chrono::Duration::days(7)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasFechas {
    pub hoy: usize,
    pub semana: usize,
    pub total: usize,
}

/// Cuenta registros de hoy y de la última semana. Un registro de hoy
/// cuenta también dentro de la semana.
pub fn estadisticas_fechas<'a, I>(fechas: I, ahora: &DateTime<Utc>) -> EstadisticasFechas
where
    I: IntoIterator<Item = Option<&'a DateTime<Utc>>>,
{
    let mut stats = EstadisticasFechas { hoy: 0, semana: 0, total: 0 };

    for fecha in fechas {
        stats.total += 1;
        let Some(fecha) = fecha else { continue };
        if es_hoy(fecha, ahora) {
            stats.hoy += 1;
            stats.semana += 1;
        } else if es_esta_semana(fecha, ahora) {
            stats.semana += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formato_dia_mes_anio() {
        let fecha = Local.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap().with_timezone(&Utc);
        assert_eq!(formatear_fecha(&fecha), "05/03/2026");
        assert_eq!(sufijo_fecha(&fecha), "20260305");
    }

    #[test]
    fn semana_incluye_hoy_y_excluye_futuro() {
        let ahora = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let hace_tres_dias = ahora - chrono::Duration::days(3);
        let hace_diez_dias = ahora - chrono::Duration::days(10);
        let futuro = ahora + chrono::Duration::days(1);

        assert!(es_esta_semana(&ahora, &ahora));
        assert!(es_esta_semana(&hace_tres_dias, &ahora));
        assert!(!es_esta_semana(&hace_diez_dias, &ahora));
        assert!(!es_esta_semana(&futuro, &ahora));
    }

    #[test]
    fn estadisticas_cuentan_hoy_dentro_de_la_semana() {
        let ahora = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let hoy = ahora - chrono::Duration::hours(1);
        let ayer = ahora - chrono::Duration::days(1);
        let viejo = ahora - chrono::Duration::days(30);

        let fechas = [Some(&hoy), Some(&ayer), Some(&viejo), None];
        let stats = estadisticas_fechas(fechas, &ahora);

        assert_eq!(stats.hoy, 1);
        assert_eq!(stats.semana, 2);
        assert_eq!(stats.total, 4);
    }
}
