// src/services/zonal.rs

//! Avance del levantamiento zonal: cruza la lista viva de clientes con
//! la tabla de objetivos del barrido geodatado. La tabla viene de un
//! CSV offline y se compila dentro del binario como tabla inmutable,
//! indexada por número de cliente entero para membresía O(1).

use std::collections::HashSet;
use std::sync::LazyLock;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{common::numero::numero_como_entero, models::cliente::Cliente};

/// Un punto del barrido zonal: número de cliente más su coordenada.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjetivoZonal {
    pub numero_cliente: u64,
    pub latitud: f64,
    pub longitud: f64,
}

static OBJETIVOS: LazyLock<Vec<ObjetivoZonal>> = LazyLock::new(|| {
    let crudo = include_str!("../../data/levantamiento_zonal.csv");
    let mut objetivos = Vec::new();

    for linea in crudo.lines().skip(1) {
        let columnas: Vec<&str> = linea.split(';').map(str::trim).collect();
        if columnas.len() < 3 {
            continue;
        }
        let (Some(numero), Ok(latitud), Ok(longitud)) = (
            numero_como_entero(columnas[0]),
            columnas[1].parse::<f64>(),
            columnas[2].parse::<f64>(),
        ) else {
            continue;
        };
        objetivos.push(ObjetivoZonal { numero_cliente: numero, latitud, longitud });
    }

    objetivos
});

static INDICE: LazyLock<HashSet<u64>> =
    LazyLock::new(|| OBJETIVOS.iter().map(|o| o.numero_cliente).collect());

pub fn objetivos() -> &'static [ObjetivoZonal] {
    &OBJETIVOS
}

pub fn es_objetivo_zonal(numero_cliente: &str) -> bool {
    numero_como_entero(numero_cliente).is_some_and(|n| INDICE.contains(&n))
}

/// Coordenada apta para el mapa: ambas componentes numéricas y
/// distintas de cero. `(0,0)` y los no numéricos se tratan como
/// coordenada ausente.
pub fn coordenadas_validas(latitud: Option<f64>, longitud: Option<f64>) -> Option<(f64, f64)> {
    match (latitud, longitud) {
        (Some(lat), Some(lng))
            if lat.is_finite() && lng.is_finite() && lat != 0.0 && lng != 0.0 =>
        {
            Some((lat, lng))
        }
        _ => None,
    }
}

/// Clase visual de un marcador en el mapa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ClaseMarcador {
    /// Cliente registrado fuera del barrido zonal (azul).
    RegistradoGeneral,
    /// Cliente registrado que pertenece al barrido zonal (verde).
    RegistradoZonal,
    /// Objetivo zonal todavía sin registro (rojo).
    PendienteZonal,
}

pub fn clase_de_cliente(cliente: &Cliente) -> ClaseMarcador {
    if es_objetivo_zonal(&cliente.numero_cliente) {
        ClaseMarcador::RegistradoZonal
    } else {
        ClaseMarcador::RegistradoGeneral
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cobertura {
    pub total_objetivos: usize,
    pub cubiertos: usize,
    /// Porcentaje de avance, redondeado a un decimal.
    pub porcentaje: f64,
    /// Objetivos sin registro y con coordenada válida, para pintar en rojo.
    pub pendientes: Vec<ObjetivoZonal>,
}

/// Recalculada en cada cambio de la lista de clientes.
pub fn cobertura(clientes: &[Cliente]) -> Cobertura {
    cobertura_sobre(clientes, &OBJETIVOS)
}

fn cobertura_sobre(clientes: &[Cliente], objetivos: &[ObjetivoZonal]) -> Cobertura {
    let registrados: HashSet<u64> = clientes
        .iter()
        .filter_map(|c| numero_como_entero(&c.numero_cliente))
        .collect();

    let cubiertos = objetivos
        .iter()
        .filter(|o| registrados.contains(&o.numero_cliente))
        .count();

    let pendientes: Vec<ObjetivoZonal> = objetivos
        .iter()
        .filter(|o| {
            !registrados.contains(&o.numero_cliente)
                && coordenadas_validas(Some(o.latitud), Some(o.longitud)).is_some()
        })
        .cloned()
        .collect();

    let porcentaje = if objetivos.is_empty() {
        0.0
    } else {
        (cubiertos as f64 / objetivos.len() as f64 * 100.0 * 10.0).round() / 10.0
    };

    Cobertura { total_objetivos: objetivos.len(), cubiertos, porcentaje, pendientes }
}
