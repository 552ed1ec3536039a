use diffusion_core::{DiffusionResult, Matrix, Scalar, Shape2D};
use diffusion_domain::{global_residual, jacobi_sweep, redblack_sweep, scatter_field, Block2DInfo, Distributed2DBlock, MpiDomain2D, Transport};
use diffusion_problem::ConstantStencil2D;
use diffusion_solvers::FPSettings;
use std::sync::Arc;

/// The physical parameters every rank in a process group constructs
/// identically — in a real deployment every rank reads the same input
/// deck, so nothing here needs to travel over the wire. Only the
/// source field itself (known in full only to the manager rank) is
/// rank-asymmetric; see [`solve_distributed`]'s `source` parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributedDiffusionProblem<T> {
    pub global_shape: Shape2D,
    pub diffusion_coefficient: T,
    pub absorption_scattering: T,
    pub dx: T,
    pub dy: T,
}

impl<T: Scalar> DistributedDiffusionProblem<T> {
    fn stencil_coefficients(&self) -> (T, T, T) {
        let two = T::one() + T::one();
        let north_south = -self.diffusion_coefficient / (self.dx * self.dx);
        let east_west = -self.diffusion_coefficient / (self.dy * self.dy);
        let center = -two * (north_south + east_west) + self.absorption_scattering;
        (center, north_south, east_west)
    }
}

/// Which relaxation sweep [`solve_distributed`] runs, and its stopping
/// criteria. Spec.md §4.5 only ever runs red/black GS/SOR in parallel;
/// Jacobi is included because its per-cell update is identical and the
/// sweep is already implemented in `diffusion-domain`.
pub enum DistributedAlgorithm<T> {
    RedBlack { settings: FPSettings<T>, omega: T },
    Jacobi { settings: FPSettings<T> },
}

/// Outcome of a distributed solve. `flux` is `Some` only on the
/// manager rank (spec.md §4.5's gather step); every other rank gets
/// `None` and should rely on the manager to report or persist the
/// result.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributedEngineResult<T> {
    pub flux: Option<Matrix<T>>,
    pub residual: T,
    pub converged: bool,
    pub iterations: usize,
    pub error: T,
}

/// Run a red/black (or Jacobi) relaxation across a process group:
/// scatter the source field from the manager rank, sweep until the
/// group-wide relative change drops below `settings.tolerance` or
/// `settings.max_iter` is exhausted, and gather the result back.
/// `source` must be `Some` on `domain.is_manager()` and is ignored on
/// every other rank. Grounded on spec.md §4.5's full parallel-solver
/// loop, built from `diffusion-domain`'s block/transport/sweep
/// primitives the way [`crate::solve`] builds on `diffusion-solvers`'s
/// single-process ones.
pub fn solve_distributed<T: Scalar, Tr: Transport<T>>(
    domain: Arc<MpiDomain2D>,
    problem: &DistributedDiffusionProblem<T>,
    source: Option<&Matrix<T>>,
    algorithm: DistributedAlgorithm<T>,
    transport: &Tr,
) -> DiffusionResult<DistributedEngineResult<T>> {
    let info = Block2DInfo::new(&domain, problem.global_shape)?;
    let mut block = Distributed2DBlock::<T>::new(Arc::clone(&domain), info.clone());
    let local_source = scatter_field(&domain, info.local_shape, source, transport)?;

    let (center, north_south, east_west) = problem.stencil_coefficients();
    let stencil = ConstantStencil2D::new(info.padded_shape(), center, north_south, north_south, east_west, east_west);

    let mut iterations = 0;
    let mut error = T::infinity();

    let settings = match &algorithm {
        DistributedAlgorithm::RedBlack { settings, .. } => settings,
        DistributedAlgorithm::Jacobi { settings } => settings,
    };

    while error >= settings.tolerance && iterations < settings.max_iter {
        error = match algorithm {
            DistributedAlgorithm::RedBlack { omega, .. } => redblack_sweep(&mut block, &stencil, &local_source, omega, transport)?,
            DistributedAlgorithm::Jacobi { .. } => jacobi_sweep(&mut block, &stencil, &local_source, transport)?,
        };
        iterations += 1;
        log::trace!("rank {}: sweep {iterations}: error = {error}", domain.rank());
    }

    let converged = error < settings.tolerance;
    if !converged {
        log::debug!("rank {}: distributed solve did not converge within {} sweeps (error = {error})", domain.rank(), settings.max_iter);
    }

    let residual = global_residual(&block, &stencil, &local_source, transport)?;
    let flux = block.gather(transport)?;

    Ok(DistributedEngineResult {
        flux,
        residual,
        converged,
        iterations,
        error,
    })
}
