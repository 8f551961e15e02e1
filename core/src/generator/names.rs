//! Deterministic person and vehicle names from curated lists.
//!
//! All generation is deterministic (same stream = same names).

use crate::rng::StreamRng;

/// Deterministic name generator using curated name lists
pub struct NameGenerator;

impl NameGenerator {
    /// First and last name, e.g. "Sofía Ramírez".
    pub fn full_name(rng: &mut StreamRng) -> String {
        let first = Self::first_name(rng);
        let last = Self::last_name(rng);
        format!("{first} {last}")
    }

    pub fn first_name(rng: &mut StreamRng) -> &'static str {
        Self::draw(rng, Self::first_names())
    }

    pub fn last_name(rng: &mut StreamRng) -> &'static str {
        Self::draw(rng, Self::last_names())
    }

    /// "Brand Body Year", e.g. "Mazda SUV 2021".
    pub fn vehicle(rng: &mut StreamRng) -> String {
        let brand = Self::draw(rng, Self::brands());
        let body = Self::draw(rng, Self::bodies());
        let year = rng.int_between(2018, 2024);
        format!("{brand} {body} {year}")
    }

    fn draw(rng: &mut StreamRng, names: &'static [&'static str]) -> &'static str {
        let index = rng.next_u64_below(names.len() as u64) as usize;
        names[index]
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "Juan", "María", "Carlos", "Ana", "Luis", "Carmen", "José", "Patricia",
            "Miguel", "Laura", "Fernando", "Elena", "Ricardo", "Isabel", "Diego",
            "Sofía", "Andrés", "Valentina", "Pablo", "Camila", "Daniel", "Mariana",
            "Roberto", "Gabriela", "Sergio", "Alejandra", "Francisco", "Daniela",
            "Eduardo", "Paulina", "Javier", "Fernanda", "Oscar", "Andrea", "Raúl",
            "Jorge",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "García", "Rodríguez", "Martínez", "López", "González", "Pérez",
            "Sánchez", "Ramírez", "Torres", "Flores", "Rivera", "Gómez",
            "Hernández", "Díaz", "Morales", "Vargas", "Rojas", "Castro", "Ortiz",
            "Ruiz", "Jiménez", "Moreno", "Medina", "Aguilar", "Cruz",
        ]
    }

    fn brands() -> &'static [&'static str] {
        &["Toyota", "Honda", "Nissan", "Mazda", "Volkswagen", "Ford", "Chevrolet"]
    }

    fn bodies() -> &'static [&'static str] {
        &["Sedan", "SUV", "Pickup", "Hatchback"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{GeneratorSlot, RngBank};

    #[test]
    fn name_generation_is_deterministic() {
        let mut rng1 = RngBank::new(12345).for_slot(GeneratorSlot::Agents);
        let mut rng2 = RngBank::new(12345).for_slot(GeneratorSlot::Agents);

        for _ in 0..20 {
            assert_eq!(NameGenerator::full_name(&mut rng1), NameGenerator::full_name(&mut rng2));
        }
    }

    #[test]
    fn generates_two_part_names() {
        let mut rng = RngBank::new(12345).for_slot(GeneratorSlot::Customers);

        for _ in 0..100 {
            let name = NameGenerator::full_name(&mut rng);
            let parts: Vec<&str> = name.split_whitespace().collect();
            assert_eq!(parts.len(), 2, "Name should have exactly 2 parts: {name}");
        }
    }

    #[test]
    fn vehicle_years_stay_in_range() {
        let mut rng = RngBank::new(7).for_slot(GeneratorSlot::Customers);

        for _ in 0..100 {
            let vehicle = NameGenerator::vehicle(&mut rng);
            let year: u32 = vehicle.rsplit(' ').next().unwrap().parse().unwrap();
            assert!((2018..2024).contains(&year), "{vehicle}");
        }
    }
}
