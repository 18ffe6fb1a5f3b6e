use catalog::Catalog;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relic_core::{Inventory, Material, MaterialId, Requirement, StepCounts, StepId};

fn build_materials(n_materials: usize, n_steps: usize) -> Vec<Material> {
    (0..n_materials)
        .map(|i| Material {
            id: MaterialId(format!("m{i}")),
            name: format!("Material {i}"),
            category: "Bench".into(),
            requirement: if i % 5 == 0 {
                Requirement::Flat { total: 18 }
            } else {
                Requirement::PerUnit {
                    quantity: (i as u64 % 7) + 1,
                    steps: (0..(i % 3) + 1)
                        .map(|s| StepId(format!("step{}", (i + s) % n_steps)))
                        .collect(),
                }
            },
        })
        .collect()
}

fn bench_compute_all(c: &mut Criterion) {
    let materials = build_materials(64, 15);
    let counts: StepCounts = (0..15).map(|s| (StepId(format!("step{s}")), s as u64)).collect();
    let inventory: Inventory = materials.iter().map(|m| (m.id.clone(), 3)).collect();
    c.bench_function("compute_all 64 materials x 21 units", |b| {
        b.iter(|| {
            let _ = black_box(relic_calc::compute_all(&materials, &counts, &inventory, 21));
        })
    });
}

fn bench_builtin_lines(c: &mut Criterion) {
    let Ok(catalog) = Catalog::builtin() else {
        return;
    };
    for line in catalog.lines() {
        // every unit done at every step
        let counts: StepCounts = line.steps.iter().map(|s| (s.id.clone(), line.unit_count())).collect();
        let inventory = Inventory::zeroed(&line.materials);
        let name = format!("compute_line {} {:?}", line.id, line.equipment);
        c.bench_function(&name, |b| {
            b.iter(|| {
                let _ = black_box(relic_calc::compute_line(line, &counts, &inventory));
            })
        });
    }
}

criterion_group!(benches, bench_compute_all, bench_builtin_lines);
criterion_main!(benches);
