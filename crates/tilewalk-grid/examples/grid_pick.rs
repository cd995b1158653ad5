use tilewalk_grid::{Grid, GridPoint, Ray, WorldPoint};

fn main() {
    let width = 10;
    let height = 10;
    let cell_size = 50.0;

    let grid = match Grid::new(width, height, cell_size) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("Error creating grid: {}", e);
            return;
        }
    };
    println!("{}", grid);

    for p in [GridPoint::new(0, 0), GridPoint::new(5, 5), GridPoint::new(9, 9)] {
        match grid.cell(p) {
            Ok(cell) => println!("  cell ({}, {}) center: {:?}", p.column, p.row, cell.center()),
            Err(e) => eprintln!("  {}", e),
        }
    }

    let camera = WorldPoint::new(600.0, 600.0, 800.0);
    let aims = [
        WorldPoint::new(0.0, 0.0, 0.0),
        WorldPoint::new(-200.0, 0.0, 100.0),
        WorldPoint::new(2000.0, 0.0, 0.0),
    ];

    println!("Picking from camera at {:?}:", camera);
    for aim in aims {
        let Some(ray) = Ray::through(camera, aim) else {
            continue;
        };
        match grid.pick_nearest(&ray, 1.0) {
            Some(hit) => println!(
                "  aim {:?} -> tile ({}, {}) at {:?}, distance {:.1}",
                aim, hit.cell.column, hit.cell.row, hit.point, hit.distance
            ),
            None => println!("  aim {:?} -> no tile", aim),
        }
    }
}
